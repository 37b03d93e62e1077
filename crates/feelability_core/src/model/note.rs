//! Note domain model and the canonical list ordering.
//!
//! # Invariants
//! - `text` is non-empty (enforced at the session boundary).
//! - The canonical list order is descending by `created_at`; notes without
//!   a timestamp sort after all timestamped notes; ties keep their original
//!   relative order.

use crate::model::identity::UserId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Stable identifier for a note.
pub type NoteId = Uuid;

/// Emotion tag attached to every note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmotionType {
    Anger,
    #[default]
    Feelings,
    Appreciation,
}

/// A single emotion-tagged note attached to a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub author_id: UserId,
    pub text: String,
    pub emotion_type: EmotionType,
    /// Creation time in epoch milliseconds; absent for legacy rows.
    pub created_at: Option<i64>,
}

/// Insert payload for a new note; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub author_id: UserId,
    pub text: String,
    pub emotion_type: EmotionType,
}

/// Sorts notes into the canonical order (stable).
pub fn sort_notes(notes: &mut [Note]) {
    notes.sort_by(|a, b| match (a.created_at, b.created_at) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a_ts), Some(b_ts)) => b_ts.cmp(&a_ts),
    });
}

#[cfg(test)]
mod tests {
    use super::{sort_notes, EmotionType, Note};
    use uuid::Uuid;

    fn note(text: &str, created_at: Option<i64>) -> Note {
        Note {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            text: text.to_string(),
            emotion_type: EmotionType::default(),
            created_at,
        }
    }

    #[test]
    fn sorts_newest_first_with_untimestamped_last() {
        let mut notes = vec![
            note("old", Some(100)),
            note("no-ts-a", None),
            note("new", Some(300)),
            note("no-ts-b", None),
            note("mid", Some(200)),
        ];
        sort_notes(&mut notes);

        let order: Vec<&str> = notes.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(order, vec!["new", "mid", "old", "no-ts-a", "no-ts-b"]);
    }

    #[test]
    fn equal_timestamps_keep_original_relative_order() {
        let mut notes = vec![note("first", Some(100)), note("second", Some(100))];
        sort_notes(&mut notes);
        assert_eq!(notes[0].text, "first");
        assert_eq!(notes[1].text, "second");
    }

    #[test]
    fn default_emotion_is_feelings() {
        assert_eq!(EmotionType::default(), EmotionType::Feelings);
    }
}
