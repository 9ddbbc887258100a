use serde::Serialize;

use super::messages::{Sentiment, SentimentReading};

/// Strongest emotion in the latest reading. Derived per reading, never
/// carried across readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DominantEmotion {
    pub name: String,
    pub score: f32,
}

/// Current sentiment projection for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentSnapshot {
    pub sentiment: Sentiment,
    pub score: f32,
    pub dominant_emotion: Option<DominantEmotion>,
}

/// Latest-wins fold over sentiment readings.
///
/// Every reading fully replaces the projection; there is no smoothing or
/// averaging. The dominant emotion is a single left-to-right scan keeping
/// the strictly greatest score, so equal scores resolve to the earlier entry
/// in the producer's key order.
#[derive(Debug, Default)]
pub struct SentimentTracker {
    current: Option<SentimentSnapshot>,
}

impl SentimentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the projection with one derived from `next`.
    pub fn observe(&mut self, next: &SentimentReading) -> &SentimentSnapshot {
        let mut dominant: Option<DominantEmotion> = None;
        for (name, score) in next.emotions.iter() {
            let stronger = match &dominant {
                Some(current) => score > current.score,
                None => true,
            };
            if stronger {
                dominant = Some(DominantEmotion {
                    name: name.to_string(),
                    score,
                });
            }
        }

        &*self.current.insert(SentimentSnapshot {
            sentiment: next.sentiment,
            score: next.score,
            dominant_emotion: dominant,
        })
    }

    pub fn current(&self) -> Option<&SentimentSnapshot> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::messages::EmotionScores;
    use chrono::Utc;

    fn reading(sentiment: Sentiment, score: f32, emotions: Vec<(&str, f32)>) -> SentimentReading {
        SentimentReading {
            text: "…".to_string(),
            sentiment,
            score,
            emotions: emotions
                .into_iter()
                .map(|(n, s)| (n.to_string(), s))
                .collect::<EmotionScores>(),
            timestamp: Utc::now(),
            source: "analyzer".to_string(),
        }
    }

    #[test]
    fn dominant_emotion_is_arg_max() {
        let mut tracker = SentimentTracker::new();
        let snap = tracker.observe(&reading(
            Sentiment::Negative,
            0.6,
            vec![("joy", 0.2), ("anger", 0.7), ("sadness", 0.1)],
        ));

        let dominant = snap.dominant_emotion.as_ref().unwrap();
        assert_eq!(dominant.name, "anger");
        assert_eq!(dominant.score, 0.7);
    }

    #[test]
    fn empty_emotions_has_no_dominant() {
        let mut tracker = SentimentTracker::new();
        let snap = tracker.observe(&reading(Sentiment::Neutral, 0.5, vec![]));
        assert!(snap.dominant_emotion.is_none());
    }

    #[test]
    fn equal_scores_keep_first_seen() {
        let mut tracker = SentimentTracker::new();
        let snap = tracker.observe(&reading(
            Sentiment::Positive,
            0.8,
            vec![("joy", 0.5), ("surprise", 0.5)],
        ));
        assert_eq!(snap.dominant_emotion.as_ref().unwrap().name, "joy");
    }

    #[test]
    fn latest_reading_fully_replaces_projection() {
        let mut tracker = SentimentTracker::new();
        tracker.observe(&reading(Sentiment::Positive, 0.9, vec![("joy", 0.9)]));
        tracker.observe(&reading(Sentiment::Negative, 0.4, vec![]));

        let current = tracker.current().unwrap();
        assert_eq!(current.sentiment, Sentiment::Negative);
        assert_eq!(current.score, 0.4);
        // The prior reading's dominant emotion does not leak through
        assert!(current.dominant_emotion.is_none());
    }
}
