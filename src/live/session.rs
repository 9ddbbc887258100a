use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::stream::StreamExt;
use futures::Stream;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::decoder::{self, StreamEvent};
use super::messages::TranscriptSegment;
use super::sentiment::{SentimentSnapshot, SentimentTracker};
use super::transcript::TranscriptReducer;
use crate::error::{DecodeError, StreamError};
use crate::pipeline::PipelineState;

/// Which typed sub-pipeline a message was routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutedKind {
    Sentiment,
    Transcript,
}

/// Demultiplexer for the interleaved live-session message stream.
///
/// Inspects each message's discriminant and routes it to the transcript
/// reducer or the sentiment tracker. Undecodable messages leave both
/// untouched. Synchronous; one instance per stream, applied strictly in
/// arrival order.
#[derive(Debug, Default)]
pub struct EventRouter {
    transcript: TranscriptReducer,
    sentiment: SentimentTracker,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one message and fold it into the matching sub-pipeline.
    pub fn ingest(&mut self, payload: &[u8]) -> Result<RoutedKind, DecodeError> {
        match decoder::decode(payload)? {
            StreamEvent::Sentiment(reading) => {
                self.sentiment.observe(&reading);
                Ok(RoutedKind::Sentiment)
            }
            StreamEvent::Transcript(segment) => {
                self.transcript.apply(segment);
                Ok(RoutedKind::Transcript)
            }
        }
    }

    pub fn transcript(&self) -> &[TranscriptSegment] {
        self.transcript.turns()
    }

    pub fn transcript_snapshot(&self) -> Vec<TranscriptSegment> {
        self.transcript.snapshot()
    }

    pub fn sentiment(&self) -> Option<&SentimentSnapshot> {
        self.sentiment.current()
    }
}

/// Live meeting session: consumes the interleaved event stream and publishes
/// immutable snapshots of the transcript sequence and sentiment projection.
///
/// One subscription at a time per session. Subscribing spawns a single
/// consumer task; the returned handle cancels it at its next suspension
/// point. A second subscribe while one is active is a configuration error
/// and leaves the running pipeline untouched.
pub struct LiveSession {
    meeting_id: String,
    transcript_tx: Arc<watch::Sender<Arc<Vec<TranscriptSegment>>>>,
    sentiment_tx: Arc<watch::Sender<Option<SentimentSnapshot>>>,
    subscribed: Arc<AtomicBool>,
}

impl LiveSession {
    pub fn new(meeting_id: impl Into<String>) -> Self {
        let (transcript_tx, _) = watch::channel(Arc::new(Vec::new()));
        let (sentiment_tx, _) = watch::channel(None);
        Self {
            meeting_id: meeting_id.into(),
            transcript_tx: Arc::new(transcript_tx),
            sentiment_tx: Arc::new(sentiment_tx),
            subscribed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn meeting_id(&self) -> &str {
        &self.meeting_id
    }

    /// Subscribe to transcript snapshots.
    pub fn transcript(&self) -> watch::Receiver<Arc<Vec<TranscriptSegment>>> {
        self.transcript_tx.subscribe()
    }

    /// Subscribe to the current sentiment projection.
    pub fn sentiment(&self) -> watch::Receiver<Option<SentimentSnapshot>> {
        self.sentiment_tx.subscribe()
    }

    /// Attach the session to a message stream and start consuming.
    pub fn subscribe<S>(&self, messages: S) -> Result<SubscriptionHandle, StreamError>
    where
        S: Stream<Item = Vec<u8>> + Send + Unpin + 'static,
    {
        if self
            .subscribed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            error!(
                meeting_id = %self.meeting_id,
                "subscribe called on an already-subscribed session"
            );
            return Err(StreamError::AlreadySubscribed {
                stream_id: self.meeting_id.clone(),
            });
        }

        info!(meeting_id = %self.meeting_id, "live session subscribed");

        let cancel = Arc::new(Notify::new());
        let task = tokio::spawn(consume_loop(
            messages,
            Arc::clone(&self.transcript_tx),
            Arc::clone(&self.sentiment_tx),
            Arc::clone(&self.subscribed),
            Arc::clone(&cancel),
            self.meeting_id.clone(),
        ));

        Ok(SubscriptionHandle { cancel, task })
    }
}

async fn consume_loop<S>(
    mut messages: S,
    transcript_tx: Arc<watch::Sender<Arc<Vec<TranscriptSegment>>>>,
    sentiment_tx: Arc<watch::Sender<Option<SentimentSnapshot>>>,
    subscribed: Arc<AtomicBool>,
    cancel: Arc<Notify>,
    meeting_id: String,
) where
    S: Stream<Item = Vec<u8>> + Unpin,
{
    let mut state = PipelineState::Idle;
    let mut router = EventRouter::new();

    loop {
        let next = tokio::select! {
            _ = cancel.notified() => {
                info!(meeting_id = %meeting_id, "live session cancelled");
                state = PipelineState::Closed;
                break;
            }
            msg = messages.next() => msg,
        };

        let Some(payload) = next else {
            // Transport finished; the session may be resubscribed later.
            info!(meeting_id = %meeting_id, "live stream ended");
            state = PipelineState::Idle;
            break;
        };

        if state == PipelineState::Idle {
            state = PipelineState::Receiving;
        }

        match router.ingest(&payload) {
            Ok(RoutedKind::Transcript) => {
                debug!(turns = router.transcript().len(), "transcript updated");
                transcript_tx.send_replace(Arc::new(router.transcript_snapshot()));
            }
            Ok(RoutedKind::Sentiment) => {
                debug!("sentiment updated");
                sentiment_tx.send_replace(router.sentiment().cloned());
            }
            Err(e) => {
                warn!(meeting_id = %meeting_id, "dropped live message: {e}");
            }
        }
    }

    debug!(meeting_id = %meeting_id, ?state, "consumer task finished");
    subscribed.store(false, Ordering::SeqCst);
}

/// Handle to an active live subscription.
pub struct SubscriptionHandle {
    cancel: Arc<Notify>,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    /// Stop the consumer at its next suspension point. Pending state is
    /// discarded, not emitted. The permit is stored, so cancelling before
    /// the consumer is suspended is not lost; repeat calls are no-ops.
    pub fn cancel(&self) {
        self.cancel.notify_one();
    }

    /// Cancel and wait for the consumer task to exit.
    pub async fn shutdown(self) {
        self.cancel.notify_one();
        if let Err(e) = self.task.await {
            error!("live consumer task panicked: {e}");
        }
    }

    /// Wait for the consumer to finish on its own (stream end).
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            error!("live consumer task panicked: {e}");
        }
    }
}
