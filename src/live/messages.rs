use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeakerRole {
    User,
    Ai,
}

/// Sentiment reading published by the analysis service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentReading {
    pub text: String,
    pub sentiment: Sentiment,
    pub score: f32,
    pub emotions: EmotionScores,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

/// Transcript segment received from the captioning service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub role: SpeakerRole,
    /// Speaker's display name
    pub name: String,
    pub content: String,
    /// Turn timestamp; stable while the captioner refines one utterance
    pub timestamp: DateTime<Utc>,
}

/// Per-emotion scores in producer order.
///
/// The upstream analyzer emits a JSON object whose key order is meaningful:
/// equal-score ties in the dominant-emotion scan resolve to the first key
/// seen. A sorted map would silently change that, so entries are kept as an
/// ordered list of unique keys.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmotionScores(Vec<(String, f32)>);

impl EmotionScores {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.0.iter().map(|(name, score)| (name.as_str(), *score))
    }
}

impl From<Vec<(String, f32)>> for EmotionScores {
    fn from(entries: Vec<(String, f32)>) -> Self {
        Self(entries)
    }
}

impl FromIterator<(String, f32)> for EmotionScores {
    fn from_iter<I: IntoIterator<Item = (String, f32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for EmotionScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, score) in &self.0 {
            map.serialize_entry(name, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EmotionScores {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoresVisitor;

        impl<'de> Visitor<'de> for ScoresVisitor {
            type Value = EmotionScores;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of emotion name to score")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, f32>()? {
                    entries.push(entry);
                }
                Ok(EmotionScores(entries))
            }
        }

        deserializer.deserialize_map(ScoresVisitor)
    }
}
