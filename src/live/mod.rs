//! Live-session event pipeline
//!
//! The room transport delivers one interleaved stream of discrete JSON
//! messages carrying two event kinds. This module reconstructs two
//! independent, ordered, deduplicated views from it while the session runs:
//! - `decoder` parses each envelope into a typed `StreamEvent`
//! - `TranscriptReducer` folds segments into the displayed turn sequence
//! - `SentimentTracker` keeps the latest-wins sentiment projection
//! - `LiveSession` ties them together behind a cancellable subscription

pub mod decoder;
mod messages;
mod sentiment;
mod session;
mod transcript;

pub use decoder::StreamEvent;
pub use messages::{EmotionScores, Sentiment, SentimentReading, SpeakerRole, TranscriptSegment};
pub use sentiment::{DominantEmotion, SentimentSnapshot, SentimentTracker};
pub use session::{EventRouter, LiveSession, RoutedKind, SubscriptionHandle};
pub use transcript::TranscriptReducer;
