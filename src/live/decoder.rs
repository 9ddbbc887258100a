use serde::Deserialize;

use super::messages::{SentimentReading, TranscriptSegment};
use crate::error::DecodeError;

/// One decoded live-session event.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Sentiment(SentimentReading),
    Transcript(TranscriptSegment),
}

/// Envelope wrapping every live-session message
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    data: serde_json::Value,
}

/// Decode one complete live-session message.
///
/// The transport delivers whole messages, so there are no framing concerns
/// here. Unparseable envelopes and payload-shape mismatches are
/// [`DecodeError::Malformed`]; an unrecognized discriminant is
/// [`DecodeError::UnknownKind`]. Both are recoverable: callers drop the
/// message and continue with the next one.
pub fn decode(payload: &[u8]) -> Result<StreamEvent, DecodeError> {
    let envelope: Envelope = serde_json::from_slice(payload)?;
    match envelope.kind.as_str() {
        "sentiment" => {
            let reading: SentimentReading = serde_json::from_value(envelope.data)?;
            Ok(StreamEvent::Sentiment(reading))
        }
        "transcript" => {
            let segment: TranscriptSegment = serde_json::from_value(envelope.data)?;
            Ok(StreamEvent::Transcript(segment))
        }
        other => Err(DecodeError::UnknownKind(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::messages::{Sentiment, SpeakerRole};

    #[test]
    fn decodes_transcript_event() {
        let msg = br#"{"type":"transcript","data":{"role":"user","name":"Ann","content":"hi","timestamp":"2024-01-01T00:00:00Z"}}"#;
        match decode(msg).unwrap() {
            StreamEvent::Transcript(seg) => {
                assert_eq!(seg.role, SpeakerRole::User);
                assert_eq!(seg.name, "Ann");
                assert_eq!(seg.content, "hi");
                assert_eq!(seg.timestamp.to_rfc3339(), "2024-01-01T00:00:00+00:00");
            }
            other => panic!("expected transcript, got {other:?}"),
        }
    }

    #[test]
    fn decodes_sentiment_event() {
        let msg = br#"{"type":"sentiment","data":{"text":"great point","sentiment":"positive","score":0.9,"emotions":{"joy":0.8,"surprise":0.3},"timestamp":"2024-01-01T00:00:05Z","source":"analyzer"}}"#;
        match decode(msg).unwrap() {
            StreamEvent::Sentiment(reading) => {
                assert_eq!(reading.sentiment, Sentiment::Positive);
                assert_eq!(reading.score, 0.9);
                assert_eq!(reading.emotions.len(), 2);
                assert_eq!(reading.source, "analyzer");
            }
            other => panic!("expected sentiment, got {other:?}"),
        }
    }

    #[test]
    fn unknown_kind_is_distinguished_from_malformed() {
        let msg = br#"{"type":"unknown","data":{}}"#;
        assert!(matches!(
            decode(msg),
            Err(DecodeError::UnknownKind(kind)) if kind == "unknown"
        ));
    }

    #[test]
    fn garbage_envelope_is_malformed() {
        assert!(matches!(
            decode(b"not json at all"),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn sentiment_payload_missing_emotions_is_malformed() {
        let msg = br#"{"type":"sentiment","data":{"text":"x","sentiment":"neutral","score":0.5,"timestamp":"2024-01-01T00:00:00Z","source":"analyzer"}}"#;
        assert!(matches!(decode(msg), Err(DecodeError::Malformed(_))));
    }
}
