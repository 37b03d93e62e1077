//! Profile store contract.
//!
//! # Responsibility
//! - Mirror the hosted profile relation: insert returns the created row,
//!   detail updates return the updated row, select-by-id returns at most
//!   one row.
//!
//! # Invariants
//! - List reads and `fetch_profile` omit `image_data`; the image is served
//!   separately by `fetch_profile_image` for payload size.
//! - Owner-only enforcement for updates/deletes lives in the store policy,
//!   not here; a non-owner delete silently affects nothing.

use crate::model::identity::UserId;
use crate::model::profile::{InteractionKind, NewProfile, Profile, ProfileDraft, ProfileId};
use crate::store::StoreResult;

/// Contract for the remote profile relation.
pub trait ProfileStore {
    /// Inserts a profile with zero counters and returns the created row.
    fn insert_profile(&self, new: &NewProfile) -> StoreResult<Profile>;

    /// Replaces name/description/visibility/image and returns the updated
    /// row.
    fn update_details(&self, id: ProfileId, details: &ProfileDraft) -> StoreResult<Profile>;

    /// Persists one interaction counter's absolute value.
    fn set_counter(&self, id: ProfileId, kind: InteractionKind, value: u32) -> StoreResult<()>;

    /// Persists the note-count mirror's absolute value.
    fn set_notes_count(&self, id: ProfileId, value: u32) -> StoreResult<()>;

    /// Fetches one profile by id, without its image payload. Unreadable
    /// rows collapse to `None`.
    fn fetch_profile(&self, id: ProfileId) -> StoreResult<Option<Profile>>;

    /// Fetches the image payload for one profile.
    fn fetch_profile_image(&self, id: ProfileId) -> StoreResult<Option<String>>;

    /// Lists profiles owned by `owner`, newest first, without image
    /// payloads.
    fn list_owned(&self, owner: UserId) -> StoreResult<Vec<Profile>>;

    /// Fetches full rows for the given ids, newest first, without image
    /// payloads. Unreadable ids are simply absent from the result.
    fn list_by_ids(&self, ids: &[ProfileId]) -> StoreResult<Vec<Profile>>;

    /// Deletes a profile, cascading its notes and collaborator rows.
    fn delete_profile(&self, id: ProfileId) -> StoreResult<()>;
}
