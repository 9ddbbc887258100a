use tracing::warn;

use crate::config::DEFAULT_MAX_PENDING_LINE_BYTES;
use crate::error::FramingError;

/// Reassembles logical lines from an arbitrarily chunked byte stream.
///
/// Chunk boundaries carry no guarantees: they may fall mid-line or even
/// mid-character. Pending bytes are kept raw between calls, so a multi-byte
/// UTF-8 character split across chunks is only decoded once its line
/// terminator arrives.
#[derive(Debug)]
pub struct ChunkedTextAssembler {
    /// Unterminated trailing bytes from previous chunks
    pending: Vec<u8>,

    /// Cap on `pending`; exceeding it drops the buffer with a framing error
    max_pending_bytes: usize,
}

impl ChunkedTextAssembler {
    pub fn new() -> Self {
        Self::with_max_pending(DEFAULT_MAX_PENDING_LINE_BYTES)
    }

    pub fn with_max_pending(max_pending_bytes: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_pending_bytes,
        }
    }

    /// Feed one chunk, yielding zero or more complete lines in order.
    ///
    /// Each item is either a line (without its `\n` terminator) or a framing
    /// error standing in for a line that had to be dropped. Errors are
    /// recoverable; the assembler stays usable for the next chunk.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Result<String, FramingError>> {
        let mut out = Vec::new();

        let mut rest = chunk;
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            let (line_tail, remainder) = rest.split_at(pos);
            rest = &remainder[1..];

            self.pending.extend_from_slice(line_tail);
            let line_bytes = std::mem::take(&mut self.pending);
            out.push(Self::decode_line(line_bytes));
        }

        if !rest.is_empty() {
            self.pending.extend_from_slice(rest);
            if self.pending.len() > self.max_pending_bytes {
                warn!(
                    pending_bytes = self.pending.len(),
                    limit = self.max_pending_bytes,
                    "pending line exceeded cap, dropping buffer"
                );
                self.pending.clear();
                out.push(Err(FramingError::PendingLineTooLong {
                    limit: self.max_pending_bytes,
                }));
            }
        }

        out
    }

    /// Emit any trailing unterminated line at end-of-stream.
    pub fn flush(&mut self) -> Option<Result<String, FramingError>> {
        if self.pending.is_empty() {
            return None;
        }
        let line_bytes = std::mem::take(&mut self.pending);
        Some(Self::decode_line(line_bytes))
    }

    /// Discard pending state without emitting (cancellation path).
    pub fn reset(&mut self) {
        self.pending.clear();
    }

    fn decode_line(bytes: Vec<u8>) -> Result<String, FramingError> {
        String::from_utf8(bytes).map_err(|_| FramingError::InvalidUtf8)
    }
}

impl Default for ChunkedTextAssembler {
    fn default() -> Self {
        Self::new()
    }
}
