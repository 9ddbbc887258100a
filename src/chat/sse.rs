/// Prefix marking a data frame in the chat event stream.
const DATA_PREFIX: &str = "data:";

/// Extract the payload of an SSE-style data frame.
///
/// Returns the text after the `data:` prefix verbatim. Whitespace inside the
/// payload is significant token output from the generator and is never
/// trimmed. Lines without the prefix (blank keep-alives, comments, other
/// framing fields) yield `None` and are silently skipped by callers.
pub fn extract(line: &str) -> Option<&str> {
    line.strip_prefix(DATA_PREFIX)
}
