//! Collaborator enrollment record.

use crate::model::identity::UserId;
use crate::model::profile::ProfileId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a collaborator enrollment row.
pub type CollaboratorId = Uuid;

/// A non-owner identity granted read/note-write access to a profile,
/// enrolled automatically on the first shared-link visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub id: CollaboratorId,
    pub profile_id: ProfileId,
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    /// Enrollment time in epoch milliseconds.
    pub created_at: i64,
}

/// Insert payload for an enrollment; the store assigns `id` and
/// `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCollaborator {
    pub profile_id: ProfileId,
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}
