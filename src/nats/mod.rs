//! NATS transport adapter for the live-session pipeline
//!
//! Subscribes to `meeting.stream.<meeting-id>` and yields whole message
//! payloads for the demultiplexer. The pipelines themselves stay generic
//! over any message stream; only this module knows about subjects.

pub mod client;

pub use client::NatsClient;
