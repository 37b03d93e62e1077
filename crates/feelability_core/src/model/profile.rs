//! Profile domain model.
//!
//! # Responsibility
//! - Define the canonical profile record and its write payloads.
//! - Enforce the name/description length contract before any remote write.
//!
//! # Invariants
//! - `name` is non-empty and at most 30 characters.
//! - `description`, when present, is at most 50 characters.
//! - Counters never go below zero (`u32` + floored decrements).

use crate::model::identity::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use uuid::Uuid;

/// Stable identifier for a profile.
pub type ProfileId = Uuid;

pub const PROFILE_NAME_MAX_CHARS: usize = 30;
pub const PROFILE_DESCRIPTION_MAX_CHARS: usize = 50;

/// Who may read a profile beyond its owner and collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Readable by anyone holding the share link.
    Public,
    /// Readable only by the owner and enrolled collaborators.
    Private,
}

/// The three animated interactions tracked per profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Punch,
    Hug,
    Kiss,
}

impl InteractionKind {
    /// Fixed animation duration the embedding UI should wait before calling
    /// `finish_interaction`.
    pub fn animation(&self) -> Duration {
        match self {
            Self::Punch => Duration::from_millis(1300),
            Self::Hug => Duration::from_millis(1000),
            Self::Kiss => Duration::from_millis(800),
        }
    }
}

/// Validation failures for profile write payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    EmptyName,
    NameTooLong(usize),
    DescriptionTooLong(usize),
}

impl Display for ProfileValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "profile name cannot be empty"),
            Self::NameTooLong(len) => write!(
                f,
                "profile name is {len} characters; maximum is {PROFILE_NAME_MAX_CHARS}"
            ),
            Self::DescriptionTooLong(len) => write!(
                f,
                "profile description is {len} characters; maximum is {PROFILE_DESCRIPTION_MAX_CHARS}"
            ),
        }
    }
}

impl Error for ProfileValidationError {}

/// Canonical profile record as mirrored from the remote store.
///
/// List reads omit `image_data` for payload size; the image is fetched
/// lazily by id and merged in afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub visibility: Visibility,
    /// Opaque encoded image payload. `None` in list reads.
    pub image_data: Option<String>,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
    pub punch_count: u32,
    pub hug_count: u32,
    pub kiss_count: u32,
    /// Mirror of the live note count, maintained by paired writes.
    pub notes_count: u32,
}

impl Profile {
    /// Current value of one interaction counter.
    pub fn counter(&self, kind: InteractionKind) -> u32 {
        match kind {
            InteractionKind::Punch => self.punch_count,
            InteractionKind::Hug => self.hug_count,
            InteractionKind::Kiss => self.kiss_count,
        }
    }

    /// Increments one interaction counter by exactly 1.
    pub fn bump_counter(&mut self, kind: InteractionKind) {
        match kind {
            InteractionKind::Punch => self.punch_count += 1,
            InteractionKind::Hug => self.hug_count += 1,
            InteractionKind::Kiss => self.kiss_count += 1,
        }
    }

    /// Synthetic in-memory profile for a guest session.
    ///
    /// Nothing about this record ever reaches a remote store; the image is
    /// a seeded placeholder URL and the id is fresh for the session.
    pub fn guest(seed: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "John Doe".to_string(),
            description: Some("Guest mode".to_string()),
            visibility: Visibility::Private,
            image_data: Some(format!("https://i.pravatar.cc/900?img={}", (seed % 70) + 1)),
            created_at: super::now_epoch_ms(),
            punch_count: 0,
            hug_count: 0,
            kiss_count: 0,
            notes_count: 0,
        }
    }
}

/// Write payload for profile creation and detail edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub name: String,
    pub description: Option<String>,
    pub visibility: Visibility,
    pub image_data: Option<String>,
}

impl ProfileDraft {
    /// Trims the text fields and checks the length contract.
    ///
    /// An empty description normalizes to `None`.
    pub fn validate(&self) -> Result<Self, ProfileValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ProfileValidationError::EmptyName);
        }
        let name_chars = name.chars().count();
        if name_chars > PROFILE_NAME_MAX_CHARS {
            return Err(ProfileValidationError::NameTooLong(name_chars));
        }

        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        if let Some(value) = description.as_deref() {
            let desc_chars = value.chars().count();
            if desc_chars > PROFILE_DESCRIPTION_MAX_CHARS {
                return Err(ProfileValidationError::DescriptionTooLong(desc_chars));
            }
        }

        Ok(Self {
            name,
            description,
            visibility: self.visibility,
            image_data: self.image_data.clone(),
        })
    }
}

/// Insert payload for a new profile; counters start at zero and the store
/// assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub owner_id: UserId,
    pub draft: ProfileDraft,
}

#[cfg(test)]
mod tests {
    use super::{ProfileDraft, ProfileValidationError, Visibility};

    fn draft(name: &str, description: Option<&str>) -> ProfileDraft {
        ProfileDraft {
            name: name.to_string(),
            description: description.map(str::to_string),
            visibility: Visibility::Private,
            image_data: None,
        }
    }

    #[test]
    fn validate_trims_and_normalizes_empty_description() {
        let validated = draft("  Alex  ", Some("   ")).validate().unwrap();
        assert_eq!(validated.name, "Alex");
        assert_eq!(validated.description, None);
    }

    #[test]
    fn validate_rejects_blank_name() {
        let err = draft("   ", None).validate().unwrap_err();
        assert_eq!(err, ProfileValidationError::EmptyName);
    }

    #[test]
    fn validate_enforces_length_limits() {
        let long_name = "x".repeat(31);
        assert!(matches!(
            draft(&long_name, None).validate(),
            Err(ProfileValidationError::NameTooLong(31))
        ));

        let long_desc = "y".repeat(51);
        assert!(matches!(
            draft("ok", Some(&long_desc)).validate(),
            Err(ProfileValidationError::DescriptionTooLong(51))
        ));

        assert!(draft(&"x".repeat(30), Some(&"y".repeat(50)))
            .validate()
            .is_ok());
    }

    #[test]
    fn guest_profile_uses_seeded_placeholder_image() {
        let profile = super::Profile::guest(140);
        assert_eq!(
            profile.image_data.as_deref(),
            Some("https://i.pravatar.cc/900?img=1")
        );
        assert_eq!(profile.notes_count, 0);
    }
}
