//! Sharing and collaboration management.
//!
//! # Invariants
//! - Every operation here is owner-gated; non-owners get `NotOwner`
//!   regardless of the profile's visibility.
//! - Enrollment is idempotent: at most one collaborator row per user and
//!   profile.
//! - Collaborator listings exclude the owner's own id (defensive filter
//!   against accidental self-enrollment).

use crate::model::collaborator::{Collaborator, CollaboratorId, NewCollaborator};
use crate::model::identity::AuthUser;
use crate::model::profile::{Profile, ProfileId};
use crate::session::{Session, SessionError, SessionResult};
use log::info;
use url::Url;

impl Session {
    /// Builds the share deep link for the active profile:
    /// `<origin>/login?redirect=/?profile=<id>`.
    pub fn share_link(&self, origin: &Url) -> SessionResult<Url> {
        let (_, profile) = self.require_owner()?;

        let mut link = origin.clone();
        link.set_path("/login");
        link.set_query(None);
        link.query_pairs_mut()
            .append_pair("redirect", &format!("/?profile={}", profile.id));
        Ok(link)
    }

    /// Lists the active profile's collaborators, oldest first, excluding
    /// the owner's own id.
    pub fn list_collaborators(&self) -> SessionResult<Vec<Collaborator>> {
        let (_, profile) = self.require_owner()?;
        let rows = self.collaborator_store.list_for_profile(profile.id)?;
        Ok(rows
            .into_iter()
            .filter(|c| c.user_id != profile.owner_id)
            .collect())
    }

    /// Removes one collaborator row. Not optimistic: the caller's view
    /// should reflect the removal only after this returns `Ok`.
    pub fn remove_collaborator(&self, id: CollaboratorId) -> SessionResult<()> {
        self.require_owner()?;
        self.collaborator_store.remove(id)?;
        Ok(())
    }

    /// Enrolls `user` on a profile unless already enrolled. Returns
    /// whether a row was created.
    pub(crate) fn ensure_collaborator(
        &self,
        profile_id: ProfileId,
        user: &AuthUser,
    ) -> SessionResult<bool> {
        if self
            .collaborator_store
            .find_for_user(profile_id, user.id)?
            .is_some()
        {
            return Ok(false);
        }

        self.collaborator_store.insert(&NewCollaborator {
            profile_id,
            user_id: user.id,
            display_name: Some(user.collaborator_display_name()),
            avatar_url: user.avatar_url.clone(),
        })?;
        info!("event=collab_enroll module=session status=ok profile={profile_id}");
        Ok(true)
    }

    fn require_owner(&self) -> SessionResult<(AuthUser, Profile)> {
        let user = self.require_auth()?;
        let profile = self
            .state
            .active_profile()
            .cloned()
            .ok_or(SessionError::NoActiveProfile)?;
        if profile.owner_id != user.id {
            return Err(SessionError::NotOwner);
        }
        Ok((user, profile))
    }
}
