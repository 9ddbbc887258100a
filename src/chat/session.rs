use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::StreamExt;
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Notify};
use tracing::{debug, info, warn};

use super::assembler::ChunkedTextAssembler;
use super::sse;
use crate::config::DEFAULT_MAX_PENDING_LINE_BYTES;
use crate::error::TransportError;
use crate::pipeline::PipelineState;

/// Inline marker appended to a partial answer when the transport fails.
/// The rendering layer shows this instead of receiving an error.
pub const STREAM_ERROR_TEXT: &str = "\n[Error: Failed to get response]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Ai,
}

/// One message in a meeting chat. While a response is streaming, the newest
/// `ai` message is the only mutable entry; everything else is immutable once
/// appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: ChatRole, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: Utc::now(),
        }
    }
}

/// Message sequence for one meeting chat, with snapshot publication.
///
/// Every mutation publishes a fresh `Arc<Vec<ChatMessage>>` through a watch
/// channel, so observers always see a complete fold result and never a
/// half-applied update.
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    /// Id of the in-flight ai message, if a response is streaming
    streaming_id: Option<String>,
    tx: watch::Sender<Arc<Vec<ChatMessage>>>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::with_history(Vec::new())
    }

    /// Seed a session from persisted history. History entries are immutable.
    pub fn with_history(history: Vec<ChatMessage>) -> Self {
        let (tx, _) = watch::channel(Arc::new(history.clone()));
        Self {
            messages: history,
            streaming_id: None,
            tx,
        }
    }

    /// Subscribe to message snapshots.
    pub fn watch(&self) -> watch::Receiver<Arc<Vec<ChatMessage>>> {
        self.tx.subscribe()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming_id.is_some()
    }

    /// Append the user's prompt and an empty in-flight ai message, returning
    /// the ai message id. Fragments accumulate there until the exchange ends.
    pub fn begin_exchange(&mut self, prompt: &str) -> String {
        self.messages
            .push(ChatMessage::new(ChatRole::User, prompt.to_string()));
        let reply = ChatMessage::new(ChatRole::Ai, String::new());
        let id = reply.id.clone();
        self.messages.push(reply);
        self.streaming_id = Some(id.clone());
        self.publish();
        id
    }

    /// Append one fragment to the in-flight ai message, in arrival order.
    /// This is the only mutation path for that content while streaming.
    pub fn append_fragment(&mut self, fragment: &str) {
        let Some(id) = self.streaming_id.clone() else {
            warn!("fragment received with no exchange in flight, dropping");
            return;
        };
        if let Some(msg) = self.messages.iter_mut().find(|m| m.id == id) {
            msg.content.push_str(fragment);
            self.publish();
        }
    }

    /// Append the inline failure marker to the partial answer.
    pub fn append_stream_error(&mut self) {
        self.append_fragment(STREAM_ERROR_TEXT);
    }

    /// Seal the in-flight message; it is immutable from here on.
    pub fn finish_exchange(&mut self) {
        self.streaming_id = None;
    }

    fn publish(&self) {
        self.tx.send_replace(Arc::new(self.messages.clone()));
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Read loop for one streamed chat response.
///
/// Consumes a chunked byte stream, reassembles lines, extracts `data:`
/// fragments, and appends them to the session's in-flight message. One
/// consumer instance serves one session at a time; chunks are applied
/// strictly in arrival order.
pub struct ChatStreamConsumer {
    assembler: ChunkedTextAssembler,
    state: PipelineState,
    cancel: Arc<Notify>,
}

impl ChatStreamConsumer {
    pub fn new() -> Self {
        Self::with_max_pending(DEFAULT_MAX_PENDING_LINE_BYTES)
    }

    pub fn with_max_pending(max_pending_bytes: usize) -> Self {
        Self {
            assembler: ChunkedTextAssembler::with_max_pending(max_pending_bytes),
            state: PipelineState::Idle,
            cancel: Arc::new(Notify::new()),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Handle for cancelling the read loop at its next suspension point.
    pub fn canceller(&self) -> ChatCanceller {
        ChatCanceller {
            cancel: Arc::clone(&self.cancel),
        }
    }

    /// Drive one response stream to completion.
    ///
    /// Returns when the stream ends, the transport fails, or the consumer is
    /// cancelled. On transport failure the inline error marker is appended to
    /// the partial answer before the error is returned. Cancellation discards
    /// any pending partial line without emitting it.
    pub async fn run<S>(
        &mut self,
        session: &mut ChatSession,
        mut stream: S,
    ) -> Result<(), TransportError>
    where
        S: Stream<Item = Result<Vec<u8>, TransportError>> + Unpin,
    {
        if self.state == PipelineState::Closed {
            warn!("chat consumer already closed, ignoring stream");
            return Ok(());
        }

        loop {
            let next = tokio::select! {
                _ = self.cancel.notified() => {
                    info!("chat stream cancelled, discarding pending fragment");
                    self.assembler.reset();
                    session.finish_exchange();
                    self.state = PipelineState::Closed;
                    return Ok(());
                }
                chunk = stream.next() => chunk,
            };

            match next {
                Some(Ok(chunk)) => {
                    if self.state == PipelineState::Idle {
                        self.state = PipelineState::Receiving;
                    }
                    debug!(bytes = chunk.len(), "chat chunk received");
                    for item in self.assembler.feed(&chunk) {
                        match item {
                            Ok(line) => {
                                if let Some(fragment) = sse::extract(&line) {
                                    session.append_fragment(fragment);
                                }
                            }
                            Err(e) => warn!("dropped chat line: {e}"),
                        }
                    }
                }
                Some(Err(e)) => {
                    warn!("chat transport failed: {e}");
                    session.append_stream_error();
                    session.finish_exchange();
                    self.state = PipelineState::Closed;
                    return Err(e);
                }
                None => {
                    // Normal end of stream: a trailing unterminated line may
                    // still carry a final fragment.
                    match self.assembler.flush() {
                        Some(Ok(line)) => {
                            if let Some(fragment) = sse::extract(&line) {
                                session.append_fragment(fragment);
                            }
                        }
                        Some(Err(e)) => warn!("dropped trailing chat line: {e}"),
                        None => {}
                    }
                    session.finish_exchange();
                    self.state = PipelineState::Idle;
                    info!("chat stream complete");
                    return Ok(());
                }
            }
        }
    }
}

impl Default for ChatStreamConsumer {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancels a running [`ChatStreamConsumer`] at its next suspension point.
#[derive(Clone)]
pub struct ChatCanceller {
    cancel: Arc<Notify>,
}

impl ChatCanceller {
    /// Request cancellation. A permit is stored, so cancelling before the
    /// consumer reaches its suspension point is not lost.
    pub fn cancel(&self) {
        self.cancel.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_exchange_appends_user_and_placeholder() {
        let mut session = ChatSession::new();
        let ai_id = session.begin_exchange("summarize the meeting");

        let msgs = session.messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, ChatRole::User);
        assert_eq!(msgs[0].content, "summarize the meeting");
        assert_eq!(msgs[1].role, ChatRole::Ai);
        assert_eq!(msgs[1].content, "");
        assert_eq!(msgs[1].id, ai_id);
        assert!(session.is_streaming());
    }

    #[test]
    fn fragments_append_only_to_in_flight_message() {
        let mut session = ChatSession::new();
        session.begin_exchange("hi");
        session.append_fragment(" Hello");
        session.append_fragment("  world");

        assert_eq!(session.messages()[1].content, " Hello  world");
        // The user message is untouched
        assert_eq!(session.messages()[0].content, "hi");
    }

    #[test]
    fn fragment_without_exchange_is_dropped() {
        let mut session = ChatSession::new();
        session.append_fragment("stray");
        assert!(session.messages().is_empty());
    }

    #[test]
    fn history_entries_stay_immutable() {
        let history = vec![
            ChatMessage::new(ChatRole::User, "earlier question".into()),
            ChatMessage::new(ChatRole::Ai, "earlier answer".into()),
        ];
        let mut session = ChatSession::with_history(history);
        session.begin_exchange("new question");
        session.append_fragment("new");

        assert_eq!(session.messages().len(), 4);
        assert_eq!(session.messages()[1].content, "earlier answer");
        assert_eq!(session.messages()[3].content, "new");
    }

    #[test]
    fn watch_sees_complete_snapshots() {
        let mut session = ChatSession::new();
        let rx = session.watch();
        session.begin_exchange("q");
        session.append_fragment("a");

        let snapshot = rx.borrow();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1].content, "a");
    }
}
