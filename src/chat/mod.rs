//! Chat response streaming pipeline
//!
//! Reassembles a token-by-token AI answer from a chunked transfer-encoded
//! response body:
//! - `ChunkedTextAssembler` turns raw byte chunks into complete lines
//! - `sse::extract` pulls the payload out of `data:` frames
//! - `ChatSession` / `ChatStreamConsumer` fold fragments into the in-flight
//!   message and publish immutable snapshots for rendering

mod assembler;
mod session;
pub mod sse;

pub use assembler::ChunkedTextAssembler;
pub use session::{
    ChatCanceller, ChatMessage, ChatRole, ChatSession, ChatStreamConsumer, STREAM_ERROR_TEXT,
};
