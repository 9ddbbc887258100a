use anyhow::Result;
use serde::Deserialize;

/// Default cap on the assembler's pending (unterminated) line buffer.
pub const DEFAULT_MAX_PENDING_LINE_BYTES: usize = 64 * 1024;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub stream: StreamConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct StreamConfig {
    /// NATS server URL for the live-session transport
    pub nats_url: String,

    /// Subject prefix for live meeting streams (subject is `<prefix>.<meeting_id>`)
    pub subject_prefix: String,

    /// Cap on the chat assembler's pending line buffer
    pub max_pending_line_bytes: usize,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "meeting-streams")?
            .set_default("stream.nats_url", "nats://localhost:4222")?
            .set_default("stream.subject_prefix", "meeting.stream")?
            .set_default(
                "stream.max_pending_line_bytes",
                DEFAULT_MAX_PENDING_LINE_BYTES as i64,
            )?
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "meeting-streams".to_string(),
            },
            stream: StreamConfig {
                nats_url: "nats://localhost:4222".to_string(),
                subject_prefix: "meeting.stream".to_string(),
                max_pending_line_bytes: DEFAULT_MAX_PENDING_LINE_BYTES,
            },
        }
    }
}
