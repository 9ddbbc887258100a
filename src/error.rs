use thiserror::Error;

/// Failure of the underlying byte/message transport.
///
/// Surfaced to the caller of the read loop; the core never retries on its
/// own. The chat pipeline additionally appends an inline error marker to the
/// in-flight answer before returning this.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("stream read failed: {0}")]
    Read(String),

    #[error("stream closed before completion")]
    PrematureClose,
}

/// Malformed line framing in the chat byte stream.
///
/// Recoverable: the offending line is dropped and the assembler keeps going.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    #[error("pending line exceeded {limit} bytes, buffer reset")]
    PendingLineTooLong { limit: usize },
}

/// Failure to decode a discrete live-session message.
///
/// Recoverable: the message is dropped without touching reducer state.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed stream envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unknown event kind `{0}`")]
    UnknownKind(String),
}

/// Misuse of the live-session subscription API.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("stream `{stream_id}` already has an active subscription")]
    AlreadySubscribed { stream_id: String },
}
