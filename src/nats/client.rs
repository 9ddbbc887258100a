use anyhow::{Context, Result};
use async_nats::Client;
use futures::{Stream, StreamExt};
use tracing::info;

/// Transport adapter delivering whole live-session messages over NATS.
///
/// The demultiplexer core only sees payload bytes; everything
/// subject-related stays here.
pub struct NatsClient {
    client: Client,
    subject_prefix: String,
}

impl NatsClient {
    /// Connect to the NATS server
    pub async fn connect(url: &str, subject_prefix: impl Into<String>) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self {
            client,
            subject_prefix: subject_prefix.into(),
        })
    }

    /// Subscribe to a meeting's interleaved event stream, yielding one
    /// complete message payload per item.
    pub async fn subscribe_stream(
        &self,
        meeting_id: &str,
    ) -> Result<impl Stream<Item = Vec<u8>> + Send + Unpin> {
        let subject = format!("{}.{}", self.subject_prefix, meeting_id);

        info!("Subscribing to live stream on {}", subject);

        let subscriber = self
            .client
            .subscribe(subject.clone())
            .await
            .with_context(|| format!("Failed to subscribe to {subject}"))?;

        Ok(subscriber.map(|msg| msg.payload.to_vec()))
    }

    /// Close the NATS connection
    pub async fn close(self) -> Result<()> {
        info!("Closing NATS connection");
        // async-nats handles cleanup on drop
        Ok(())
    }
}
