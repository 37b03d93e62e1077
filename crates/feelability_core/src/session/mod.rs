//! Session facade over the view state, remote stores, and local cache.
//!
//! # Responsibility
//! - Own the per-session wiring: identity, store handles, cache, state.
//! - Host the error taxonomy shared by every session operation.
//!
//! # Invariants
//! - Guest sessions never call a remote store or touch the local cache.
//! - Nothing in this layer retries automatically; every retry is a
//!   re-invocation of the same user action.

mod interactions;
mod notes;
mod profiles;
mod sharing;

use crate::cache::CacheStore;
use crate::entry::EntryParams;
use crate::model::identity::{AuthUser, Identity};
use crate::model::profile::{Profile, ProfileValidationError};
use crate::state::ViewState;
use crate::store::collaborator_store::CollaboratorStore;
use crate::store::note_store::NoteStore;
use crate::store::profile_store::ProfileStore;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type SessionResult<T> = Result<T, SessionError>;

/// Failure surface of session operations.
#[derive(Debug)]
pub enum SessionError {
    /// A shared link pointed at a profile the visitor may not see; the
    /// whole view is overridden, no partial UI.
    AccessDenied,
    /// The operation requires an authenticated identity.
    NotAuthenticated,
    /// The operation requires an active profile.
    NoActiveProfile,
    /// The profile id is not in the merged set.
    UnknownProfile(crate::model::profile::ProfileId),
    /// Note text was empty after trimming.
    EmptyNote,
    /// Owner-only operation invoked by a non-owner.
    NotOwner,
    /// Only the author may delete a note.
    NotAuthor,
    /// Another single-flight operation is in progress.
    Busy,
    Validation(ProfileValidationError),
    Store(StoreError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessDenied => write!(f, "access to the shared profile was denied"),
            Self::NotAuthenticated => write!(f, "operation requires an authenticated identity"),
            Self::NoActiveProfile => write!(f, "no active profile is selected"),
            Self::UnknownProfile(id) => write!(f, "profile not in the merged set: {id}"),
            Self::EmptyNote => write!(f, "note text cannot be empty"),
            Self::NotOwner => write!(f, "only the profile owner may do this"),
            Self::NotAuthor => write!(f, "only the note author may delete it"),
            Self::Busy => write!(f, "another operation is in progress"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProfileValidationError> for SessionError {
    fn from(value: ProfileValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// The remote-store handles a session runs against, already scoped to the
/// calling identity by whoever opened them.
pub struct SessionStores {
    pub profiles: Arc<dyn ProfileStore>,
    pub notes: Arc<dyn NoteStore>,
    pub collaborators: Arc<dyn CollaboratorStore>,
}

/// One user-facing session: a single identity, a single active profile at
/// a time.
pub struct Session {
    identity: Identity,
    profile_store: Arc<dyn ProfileStore>,
    note_store: Arc<dyn NoteStore>,
    collaborator_store: Arc<dyn CollaboratorStore>,
    cache: CacheStore,
    entry: EntryParams,
    state: ViewState,
    create_prompted: bool,
}

impl Session {
    /// Opens a session. A guest session is seeded immediately with its
    /// synthetic profile; an authenticated session starts empty until
    /// `load_profiles` runs.
    pub fn start(
        identity: Identity,
        stores: SessionStores,
        cache: CacheStore,
        entry: EntryParams,
    ) -> Self {
        let mut state = ViewState::default();

        if let Identity::Guest(visitor) = &identity {
            let profile = Profile::guest(visitor.seed);
            if let Some(image) = profile.image_data.clone() {
                state.set_image(profile.id, image);
            }
            let active = profile.id;
            state.replace_profiles(vec![profile]);
            state.set_active(Some(active));
        }

        Self {
            identity,
            profile_store: stores.profiles,
            note_store: stores.notes,
            collaborator_store: stores.collaborators,
            cache,
            entry,
            state,
            create_prompted: false,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn entry(&self) -> &EntryParams {
        &self.entry
    }

    /// The authenticated account, or `NotAuthenticated` for guests.
    fn require_auth(&self) -> SessionResult<AuthUser> {
        self.identity
            .auth_user()
            .cloned()
            .ok_or(SessionError::NotAuthenticated)
    }
}
