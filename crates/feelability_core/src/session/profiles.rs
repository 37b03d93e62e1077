//! Profile synchronizer.
//!
//! # Responsibility
//! - Produce the complete, de-duplicated, newest-first set of profiles the
//!   identity may see, and select exactly one as active.
//! - Own profile creation, detail edits, deletion, switching, and lazy
//!   image resolution.
//!
//! # Invariants
//! - A failed owned-profiles query aborts the whole load; collaborator
//!   fetch failures degrade to an owned-only view with a warning.
//! - A missing or forbidden shared link is terminal: access denied, no
//!   partial UI.
//! - Shared-link visitors who are not the owner are enrolled as
//!   collaborators idempotently.
//! - The cache is only ever written under the authenticated identity's
//!   namespace.

use crate::model::identity::AuthUser;
use crate::model::profile::{NewProfile, Profile, ProfileDraft, ProfileId, Visibility};
use crate::session::{Session, SessionError, SessionResult};
use log::{error, info, warn};
use std::collections::BTreeMap;
use std::time::Instant;

impl Session {
    /// Loads the merged profile set and selects the active profile.
    ///
    /// Paints the cached snapshot first (non-authoritative), then fetches
    /// owned profiles and collaborator ids, resolves the shared deep link
    /// if one was supplied, merges, persists, and selects. Finishes by
    /// loading notes for the selection.
    pub fn load_profiles(&mut self) -> SessionResult<()> {
        if self.identity.is_guest() {
            // Guest state is seeded at session start; nothing to fetch.
            return Ok(());
        }
        let user = self.require_auth()?;
        let started_at = Instant::now();
        self.state.set_access_denied(false);

        self.paint_cached_snapshot(&user);

        // Both queries complete before any merging happens.
        let owned = match self.profile_store.list_owned(user.id) {
            Ok(owned) => owned,
            Err(err) => {
                error!(
                    "event=profiles_load module=session status=error stage=owned duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                return Err(err.into());
            }
        };
        let collab_ids = match self.collaborator_store.profile_ids_for_user(user.id) {
            Ok(ids) => ids,
            Err(err) => {
                // Degrade to an owned-only view.
                warn!("event=profiles_load module=session status=degraded stage=collab_ids error={err}");
                Vec::new()
            }
        };

        let shared = if collab_ids.is_empty() {
            Vec::new()
        } else {
            match self.profile_store.list_by_ids(&collab_ids) {
                Ok(shared) => shared,
                Err(err) => {
                    warn!(
                        "event=profiles_load module=session status=degraded stage=shared error={err}"
                    );
                    Vec::new()
                }
            }
        };

        // Merge by id, owned/shared duplicates resolved by last write in
        // merge order.
        let mut merged_by_id: BTreeMap<ProfileId, Profile> = BTreeMap::new();
        for profile in owned.into_iter().chain(shared) {
            merged_by_id.insert(profile.id, profile);
        }

        let mut active_from_link = None;
        if let Some(link_id) = self.entry.shared_profile {
            let link_profile = self.resolve_shared_link(link_id, &user, &collab_ids)?;
            active_from_link = Some(link_profile.id);
            merged_by_id.insert(link_profile.id, link_profile);
        }

        let mut merged: Vec<Profile> = merged_by_id.into_values().collect();
        merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let count = merged.len();
        self.state.replace_profiles(merged);

        self.persist_profile_cache(&user);

        let selected = match active_from_link {
            Some(id) => Some(id),
            None => {
                let remembered = self
                    .cache
                    .read_active_profile(user.id)
                    .filter(|id| self.state.profile(*id).is_some());
                match remembered {
                    Some(id) => Some(id),
                    None => {
                        let first = self.state.profiles().first().map(|p| p.id);
                        if let Some(id) = first {
                            self.cache.write_active_profile(user.id, id);
                        }
                        first
                    }
                }
            }
        };
        self.state.set_active(selected);

        info!(
            "event=profiles_load module=session status=ok count={count} duration_ms={}",
            started_at.elapsed().as_millis()
        );

        self.load_notes()
    }

    /// Creates a profile, prepends it, and makes it active.
    pub fn create_profile(&mut self, draft: &ProfileDraft) -> SessionResult<ProfileId> {
        let user = self.require_auth()?;
        let draft = draft.validate()?;

        let created = self.profile_store.insert_profile(&NewProfile {
            owner_id: user.id,
            draft,
        })?;
        let id = created.id;

        if let Some(image) = created.image_data.clone() {
            self.state.set_image(id, image);
        }
        self.state.set_profile(created);
        self.state.set_active(Some(id));
        self.state.set_notes(Vec::new());
        self.cache.write_active_profile(user.id, id);
        self.persist_profile_cache(&user);

        info!("event=profile_create module=session status=ok profile={id}");
        Ok(id)
    }

    /// Replaces a profile's details. Switching it to private drops all of
    /// its collaborator enrollments.
    pub fn update_profile(&mut self, id: ProfileId, draft: &ProfileDraft) -> SessionResult<()> {
        let user = self.require_auth()?;
        let draft = draft.validate()?;

        let updated = self.profile_store.update_details(id, &draft)?;
        let made_private = updated.visibility == Visibility::Private;

        if let Some(image) = updated.image_data.clone() {
            self.state.set_image(id, image);
        }
        self.state.set_profile(updated);

        if made_private {
            if let Err(err) = self.collaborator_store.remove_all_for_profile(id) {
                warn!(
                    "event=profile_update module=session status=degraded stage=collab_clear profile={id} error={err}"
                );
            }
        }

        self.persist_profile_cache(&user);
        info!("event=profile_update module=session status=ok profile={id}");
        Ok(())
    }

    /// Deletes an owned profile; the remote store cascades its notes and
    /// collaborator rows. The active pointer moves to the most recent
    /// remaining profile, or clears.
    pub fn delete_profile(&mut self, id: ProfileId) -> SessionResult<()> {
        let user = self.require_auth()?;
        let owned = self
            .state
            .profile(id)
            .is_some_and(|profile| profile.owner_id == user.id);
        if !owned {
            return Err(SessionError::NotOwner);
        }

        self.profile_store.delete_profile(id)?;
        self.state.remove_profile(id);
        self.cache.remove_notes(user.id, id);

        if self.state.active_profile_id() == Some(id) {
            let next = self.state.profiles().first().map(|p| p.id);
            self.state.set_active(next);
            match next {
                Some(next_id) => {
                    self.cache.write_active_profile(user.id, next_id);
                    self.persist_profile_cache(&user);
                    info!("event=profile_delete module=session status=ok profile={id}");
                    return self.load_notes();
                }
                None => {
                    self.cache.clear_active_profile(user.id);
                    self.state.set_notes(Vec::new());
                }
            }
        }

        self.persist_profile_cache(&user);
        info!("event=profile_delete module=session status=ok profile={id}");
        Ok(())
    }

    /// Makes another profile from the merged set active and reloads its
    /// notes. Gated by the single-flight rule.
    pub fn switch_profile(&mut self, id: ProfileId) -> SessionResult<()> {
        if self.state.profile(id).is_none() {
            return Err(SessionError::UnknownProfile(id));
        }
        if !self.state.begin_profile_switch() {
            return Err(SessionError::Busy);
        }

        self.state.set_active(Some(id));
        if let Some(user) = self.identity.auth_user() {
            self.cache.write_active_profile(user.id, id);
        }

        let result = self.load_notes();
        self.state.end_profile_switch();
        result
    }

    /// Resolves a profile's image, fetching it lazily when neither the
    /// state nor the record carries one. Fetch failures degrade to `None`.
    pub fn ensure_profile_image(&mut self, id: ProfileId) -> SessionResult<Option<String>> {
        if let Some(image) = self.state.image_for(id) {
            return Ok(Some(image.to_string()));
        }
        if let Some(image) = self
            .state
            .profile(id)
            .and_then(|profile| profile.image_data.clone())
        {
            self.state.set_image(id, image.clone());
            return Ok(Some(image));
        }
        if self.identity.is_guest() {
            return Ok(None);
        }
        let user = self.require_auth()?;

        let image = match self.profile_store.fetch_profile_image(id) {
            Ok(image) => image,
            Err(err) => {
                warn!("event=image_load module=session status=error profile={id} error={err}");
                return Ok(None);
            }
        };
        if let Some(data) = image {
            self.state.set_image(id, data.clone());
            self.cache.write_images(user.id, self.state.images());
            return Ok(Some(data));
        }
        Ok(None)
    }

    /// True exactly once when the `create` entry flag is set, the identity
    /// is authenticated, and the merged set is empty.
    pub fn take_create_prompt(&mut self) -> bool {
        if self.create_prompted
            || !self.entry.prompt_create
            || self.identity.is_guest()
            || !self.state.profiles().is_empty()
        {
            return false;
        }
        self.create_prompted = true;
        true
    }

    /// Paints the cached snapshot and, when no deep link overrides it,
    /// pre-selects the remembered or most recent profile.
    fn paint_cached_snapshot(&mut self, user: &AuthUser) {
        let painted = match self.cache.read_profiles(user.id) {
            Some(cached) => {
                self.state.replace_profiles(cached);
                true
            }
            None => false,
        };
        if let Some(images) = self.cache.read_images(user.id) {
            self.state.set_images(images);
        }
        if !painted || self.entry.shared_profile.is_some() {
            return;
        }

        let remembered = self
            .cache
            .read_active_profile(user.id)
            .filter(|id| self.state.profile(*id).is_some());
        let selected = remembered.or_else(|| self.state.profiles().first().map(|p| p.id));
        if let Some(id) = selected {
            if remembered.is_none() {
                self.cache.write_active_profile(user.id, id);
            }
            self.state.set_active(Some(id));
        }
    }

    /// Fetches and authorizes the shared-link profile; enrolls non-owner
    /// visitors. Missing and forbidden collapse to the same terminal state.
    fn resolve_shared_link(
        &mut self,
        link_id: ProfileId,
        user: &AuthUser,
        collab_ids: &[ProfileId],
    ) -> SessionResult<Profile> {
        let link_profile = match self.profile_store.fetch_profile(link_id) {
            Ok(Some(profile)) => profile,
            Ok(None) | Err(_) => {
                warn!("event=shared_link module=session status=denied profile={link_id}");
                self.state.set_access_denied(true);
                return Err(SessionError::AccessDenied);
            }
        };

        let is_owner = link_profile.owner_id == user.id;
        let is_collaborator = collab_ids.contains(&link_id);
        if !is_owner && link_profile.visibility != Visibility::Public && !is_collaborator {
            warn!("event=shared_link module=session status=denied profile={link_id}");
            self.state.set_access_denied(true);
            return Err(SessionError::AccessDenied);
        }

        if !is_owner {
            // Best effort: a failed enrollment degrades, the view still loads.
            if let Err(err) = self.ensure_collaborator(link_id, user) {
                warn!(
                    "event=shared_link module=session status=degraded stage=enroll profile={link_id} error={err}"
                );
            }
        }

        Ok(link_profile)
    }

    /// Persists the merged list and resolved images, pruning image entries
    /// whose profile is gone.
    fn persist_profile_cache(&mut self, user: &AuthUser) {
        let images: BTreeMap<ProfileId, String> = self
            .state
            .images()
            .iter()
            .filter(|(id, _)| self.state.profile(**id).is_some())
            .map(|(id, data)| (*id, data.clone()))
            .collect();
        self.state.set_images(images);

        self.cache.write_profiles(user.id, self.state.profiles());
        self.cache.write_images(user.id, self.state.images());
    }
}
