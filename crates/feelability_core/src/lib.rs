//! Core engine for Feelability.
//! This crate is the single source of truth for the profile/notes
//! synchronization model: merged profile loading, the optimistic local
//! cache, interaction counters, and link-based sharing. The UI layer in
//! front of it is a separate concern.

pub mod cache;
pub mod db;
pub mod entry;
pub mod logging;
pub mod model;
pub mod session;
pub mod state;
pub mod store;

pub use cache::CacheStore;
pub use entry::EntryParams;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::collaborator::{Collaborator, CollaboratorId, NewCollaborator};
pub use model::identity::{AuthUser, GuestVisitor, Identity, UserId};
pub use model::note::{sort_notes, EmotionType, NewNote, Note, NoteId};
pub use model::profile::{
    InteractionKind, NewProfile, Profile, ProfileDraft, ProfileId, ProfileValidationError,
    Visibility,
};
pub use session::{Session, SessionError, SessionResult, SessionStores};
pub use state::ViewState;
pub use store::memory::{MemoryBackend, MemoryClient};
pub use store::{StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
