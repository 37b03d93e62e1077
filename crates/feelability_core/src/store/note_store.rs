//! Notes store contract.

use crate::model::note::{NewNote, Note, NoteId};
use crate::model::profile::ProfileId;
use crate::store::StoreResult;

/// Contract for the per-profile note log.
pub trait NoteStore {
    /// Inserts a note for the profile and returns the created row.
    fn insert_note(&self, profile_id: ProfileId, new: &NewNote) -> StoreResult<Note>;

    /// Lists the profile's notes, newest first. Unreadable profiles yield
    /// an empty list.
    fn list_notes(&self, profile_id: ProfileId) -> StoreResult<Vec<Note>>;

    /// Deletes one note by id. Author-only enforcement is the store's job;
    /// a non-author delete silently affects nothing.
    fn delete_note(&self, id: NoteId) -> StoreResult<()>;
}
