pub mod chat;
pub mod config;
pub mod error;
pub mod live;
pub mod nats;
pub mod pipeline;

pub use chat::{
    ChatCanceller, ChatMessage, ChatRole, ChatSession, ChatStreamConsumer, ChunkedTextAssembler,
};
pub use config::Config;
pub use error::{DecodeError, FramingError, StreamError, TransportError};
pub use live::{
    DominantEmotion, EventRouter, LiveSession, Sentiment, SentimentReading, SentimentSnapshot,
    SentimentTracker, SpeakerRole, StreamEvent, SubscriptionHandle, TranscriptReducer,
    TranscriptSegment,
};
pub use nats::NatsClient;
pub use pipeline::PipelineState;
