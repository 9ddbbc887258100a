use super::messages::TranscriptSegment;

/// Folds transcript segments into the displayed turn sequence.
///
/// The captioning source re-sends a growing transcript for the current
/// utterance under a stable (role, name, timestamp) triple. When the
/// incoming segment matches the *last* turn on all three, it supersedes that
/// turn's content in place; anything else starts a new turn. Lookback is
/// strictly one element: searching further back would merge non-adjacent
/// turns from a speaker who talks, pauses, and talks again.
#[derive(Debug, Default)]
pub struct TranscriptReducer {
    turns: Vec<TranscriptSegment>,
}

impl TranscriptReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one segment: refine the current turn or append a new one.
    pub fn apply(&mut self, next: TranscriptSegment) {
        match self.turns.last_mut() {
            Some(last)
                if last.role == next.role
                    && last.name == next.name
                    && last.timestamp == next.timestamp =>
            {
                *last = next;
            }
            _ => self.turns.push(next),
        }
    }

    pub fn turns(&self) -> &[TranscriptSegment] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Copy-on-write view of the current turn sequence for publication.
    pub fn snapshot(&self) -> Vec<TranscriptSegment> {
        self.turns.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::messages::SpeakerRole;
    use chrono::{DateTime, Utc};

    fn seg(role: SpeakerRole, name: &str, content: &str, ts: &str) -> TranscriptSegment {
        TranscriptSegment {
            role,
            name: name.to_string(),
            content: content.to_string(),
            timestamp: ts.parse::<DateTime<Utc>>().unwrap(),
        }
    }

    #[test]
    fn same_turn_refinement_replaces_last() {
        let mut reducer = TranscriptReducer::new();
        reducer.apply(seg(SpeakerRole::Ai, "Bot", "Hel", "2024-01-01T00:00:00Z"));
        reducer.apply(seg(SpeakerRole::Ai, "Bot", "Hello", "2024-01-01T00:00:00Z"));

        assert_eq!(reducer.len(), 1);
        assert_eq!(reducer.turns()[0].content, "Hello");
    }

    #[test]
    fn different_role_starts_new_turn() {
        let mut reducer = TranscriptReducer::new();
        reducer.apply(seg(SpeakerRole::Ai, "Bot", "Hello", "2024-01-01T00:00:00Z"));
        reducer.apply(seg(SpeakerRole::User, "You", "Hi", "2024-01-01T00:00:02Z"));

        assert_eq!(reducer.len(), 2);
        assert_eq!(reducer.turns()[0].content, "Hello");
        assert_eq!(reducer.turns()[1].content, "Hi");
    }

    #[test]
    fn new_timestamp_from_same_speaker_starts_new_turn() {
        let mut reducer = TranscriptReducer::new();
        reducer.apply(seg(SpeakerRole::User, "Ann", "first", "2024-01-01T00:00:00Z"));
        reducer.apply(seg(
            SpeakerRole::User,
            "Ann",
            "second",
            "2024-01-01T00:00:05Z",
        ));

        assert_eq!(reducer.len(), 2);
    }

    #[test]
    fn lookback_is_last_element_only() {
        // Ann speaks, Bot interjects, Ann's turn re-sent: must NOT merge
        // back into her earlier entry.
        let mut reducer = TranscriptReducer::new();
        reducer.apply(seg(SpeakerRole::User, "Ann", "one", "2024-01-01T00:00:00Z"));
        reducer.apply(seg(SpeakerRole::Ai, "Bot", "two", "2024-01-01T00:00:01Z"));
        reducer.apply(seg(SpeakerRole::User, "Ann", "three", "2024-01-01T00:00:00Z"));

        assert_eq!(reducer.len(), 3);
        assert_eq!(reducer.turns()[0].content, "one");
        assert_eq!(reducer.turns()[2].content, "three");
    }

    #[test]
    fn completed_turns_are_never_reordered_or_dropped() {
        let mut reducer = TranscriptReducer::new();
        reducer.apply(seg(SpeakerRole::User, "Ann", "a", "2024-01-01T00:00:00Z"));
        reducer.apply(seg(SpeakerRole::Ai, "Bot", "b", "2024-01-01T00:00:01Z"));
        reducer.apply(seg(SpeakerRole::Ai, "Bot", "bb", "2024-01-01T00:00:01Z"));
        reducer.apply(seg(SpeakerRole::User, "Ann", "c", "2024-01-01T00:00:02Z"));

        let contents: Vec<&str> = reducer.turns().iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "bb", "c"]);
    }
}
