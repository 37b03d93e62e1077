//! In-memory reference backend for the remote-store contracts.
//!
//! # Responsibility
//! - Implement all three store traits over shared tenant data, mirroring
//!   the hosted backend's row-level policy semantics.
//! - Give tests one-shot failure injection per operation name.
//!
//! # Invariants
//! - Clients carry the identity they were opened for; policy checks use
//!   it, never a caller-supplied id.
//! - Private profiles are unreadable by non-owner/non-collaborator.
//! - Non-owner updates/deletes affect zero rows instead of erroring.
//! - Assigned timestamps never go backwards within one backend.

use crate::model::collaborator::{Collaborator, CollaboratorId, NewCollaborator};
use crate::model::identity::{Identity, UserId};
use crate::model::note::{sort_notes, NewNote, Note, NoteId};
use crate::model::now_epoch_ms;
use crate::model::profile::{
    InteractionKind, NewProfile, Profile, ProfileDraft, ProfileId, Visibility,
};
use crate::store::collaborator_store::CollaboratorStore;
use crate::store::note_store::NoteStore;
use crate::store::profile_store::ProfileStore;
use crate::store::{StoreError, StoreResult};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Default)]
struct TenantData {
    profiles: BTreeMap<ProfileId, Profile>,
    notes: BTreeMap<NoteId, (ProfileId, Note)>,
    collaborators: BTreeMap<CollaboratorId, Collaborator>,
    clock_ms: i64,
    fail_once: BTreeSet<String>,
    mutations: u64,
}

impl TenantData {
    fn take_failure(&mut self, op: &str) -> StoreResult<()> {
        if self.fail_once.remove(op) {
            return Err(StoreError::Backend(format!("injected failure: {op}")));
        }
        Ok(())
    }

    fn next_ts(&mut self) -> i64 {
        self.clock_ms = now_epoch_ms().max(self.clock_ms + 1);
        self.clock_ms
    }

    fn is_collaborator(&self, profile_id: ProfileId, user_id: UserId) -> bool {
        self.collaborators
            .values()
            .any(|c| c.profile_id == profile_id && c.user_id == user_id)
    }

    fn can_read(&self, profile: &Profile, user_id: UserId) -> bool {
        profile.owner_id == user_id
            || profile.visibility == Visibility::Public
            || self.is_collaborator(profile.id, user_id)
    }
}

/// Strips the image payload the way list/select reads do.
fn without_image(profile: &Profile) -> Profile {
    Profile {
        image_data: None,
        ..profile.clone()
    }
}

fn newest_first(profiles: &mut [Profile]) {
    profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Shared tenant data; open per-identity clients with [`MemoryBackend::client`].
#[derive(Default, Clone)]
pub struct MemoryBackend {
    shared: Arc<Mutex<TenantData>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a store handle scoped to `identity`, usable as all three
    /// store traits.
    pub fn client(&self, identity: Identity) -> Arc<MemoryClient> {
        Arc::new(MemoryClient {
            shared: Arc::clone(&self.shared),
            identity,
        })
    }

    /// Makes the next call of the named operation fail with a backend
    /// error. Operation names match the trait method being exercised,
    /// e.g. `note_delete`, `profiles_list_owned`, `counter_set`.
    pub fn fail_once(&self, op: &str) {
        self.lock().fail_once.insert(op.to_string());
    }

    /// Number of mutating calls that reached tenant data.
    pub fn mutation_count(&self) -> u64 {
        self.lock().mutations
    }

    /// Test helper: the stored row, image included, bypassing policy.
    pub fn profile_row(&self, id: ProfileId) -> Option<Profile> {
        self.lock().profiles.get(&id).cloned()
    }

    /// Test helper: all enrollments on a profile, bypassing policy.
    pub fn collaborator_rows(&self, profile_id: ProfileId) -> Vec<Collaborator> {
        self.lock()
            .collaborators
            .values()
            .filter(|c| c.profile_id == profile_id)
            .cloned()
            .collect()
    }

    /// Test helper: all notes on a profile, bypassing policy.
    pub fn note_rows(&self, profile_id: ProfileId) -> Vec<Note> {
        self.lock()
            .notes
            .values()
            .filter(|(owner, _)| *owner == profile_id)
            .map(|(_, note)| note.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, TenantData> {
        self.shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Store handle scoped to one identity.
pub struct MemoryClient {
    shared: Arc<Mutex<TenantData>>,
    identity: Identity,
}

impl MemoryClient {
    fn lock(&self) -> StoreResult<MutexGuard<'_, TenantData>> {
        self.shared
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }

    fn user_id(&self) -> UserId {
        self.identity.user_id()
    }
}

impl ProfileStore for MemoryClient {
    fn insert_profile(&self, new: &NewProfile) -> StoreResult<Profile> {
        let mut data = self.lock()?;
        data.take_failure("profile_insert")?;

        let user = self.identity.auth_user().ok_or(StoreError::Denied)?;
        if new.owner_id != user.id {
            return Err(StoreError::Denied);
        }

        let created_at = data.next_ts();
        let profile = Profile {
            id: Uuid::new_v4(),
            owner_id: new.owner_id,
            name: new.draft.name.clone(),
            description: new.draft.description.clone(),
            visibility: new.draft.visibility,
            image_data: new.draft.image_data.clone(),
            created_at,
            punch_count: 0,
            hug_count: 0,
            kiss_count: 0,
            notes_count: 0,
        };
        data.profiles.insert(profile.id, profile.clone());
        data.mutations += 1;
        Ok(profile)
    }

    fn update_details(&self, id: ProfileId, details: &ProfileDraft) -> StoreResult<Profile> {
        let mut data = self.lock()?;
        data.take_failure("profile_update")?;

        let user_id = self.user_id();
        let profile = match data.profiles.get_mut(&id) {
            Some(profile) if profile.owner_id == user_id => profile,
            // Missing and forbidden collapse to the same denial.
            _ => return Err(StoreError::Denied),
        };
        profile.name = details.name.clone();
        profile.description = details.description.clone();
        profile.visibility = details.visibility;
        profile.image_data = details.image_data.clone();
        let updated = profile.clone();
        data.mutations += 1;
        Ok(updated)
    }

    fn set_counter(&self, id: ProfileId, kind: InteractionKind, value: u32) -> StoreResult<()> {
        let mut data = self.lock()?;
        data.take_failure("counter_set")?;

        let user_id = self.user_id();
        let readable = data
            .profiles
            .get(&id)
            .is_some_and(|profile| data.can_read(profile, user_id));
        if !readable {
            return Ok(());
        }
        if let Some(profile) = data.profiles.get_mut(&id) {
            match kind {
                InteractionKind::Punch => profile.punch_count = value,
                InteractionKind::Hug => profile.hug_count = value,
                InteractionKind::Kiss => profile.kiss_count = value,
            }
            data.mutations += 1;
        }
        Ok(())
    }

    fn set_notes_count(&self, id: ProfileId, value: u32) -> StoreResult<()> {
        let mut data = self.lock()?;
        data.take_failure("notes_count_set")?;

        let user_id = self.user_id();
        let readable = data
            .profiles
            .get(&id)
            .is_some_and(|profile| data.can_read(profile, user_id));
        if !readable {
            return Ok(());
        }
        if let Some(profile) = data.profiles.get_mut(&id) {
            profile.notes_count = value;
            data.mutations += 1;
        }
        Ok(())
    }

    fn fetch_profile(&self, id: ProfileId) -> StoreResult<Option<Profile>> {
        let mut data = self.lock()?;
        data.take_failure("profile_fetch")?;

        let user_id = self.user_id();
        Ok(data
            .profiles
            .get(&id)
            .filter(|profile| data.can_read(profile, user_id))
            .map(without_image))
    }

    fn fetch_profile_image(&self, id: ProfileId) -> StoreResult<Option<String>> {
        let mut data = self.lock()?;
        data.take_failure("image_fetch")?;

        let user_id = self.user_id();
        Ok(data
            .profiles
            .get(&id)
            .filter(|profile| data.can_read(profile, user_id))
            .and_then(|profile| profile.image_data.clone()))
    }

    fn list_owned(&self, owner: UserId) -> StoreResult<Vec<Profile>> {
        let mut data = self.lock()?;
        data.take_failure("profiles_list_owned")?;

        if owner != self.user_id() {
            return Ok(Vec::new());
        }
        let mut owned: Vec<Profile> = data
            .profiles
            .values()
            .filter(|profile| profile.owner_id == owner)
            .map(without_image)
            .collect();
        newest_first(&mut owned);
        Ok(owned)
    }

    fn list_by_ids(&self, ids: &[ProfileId]) -> StoreResult<Vec<Profile>> {
        let mut data = self.lock()?;
        data.take_failure("profiles_list_by_ids")?;

        let user_id = self.user_id();
        let mut found: Vec<Profile> = ids
            .iter()
            .filter_map(|id| data.profiles.get(id))
            .filter(|profile| data.can_read(profile, user_id))
            .map(without_image)
            .collect();
        newest_first(&mut found);
        Ok(found)
    }

    fn delete_profile(&self, id: ProfileId) -> StoreResult<()> {
        let mut data = self.lock()?;
        data.take_failure("profile_delete")?;

        let user_id = self.user_id();
        let owned = data
            .profiles
            .get(&id)
            .is_some_and(|profile| profile.owner_id == user_id);
        if !owned {
            // Non-owner delete affects zero rows.
            return Ok(());
        }
        data.profiles.remove(&id);
        data.notes.retain(|_, (profile_id, _)| *profile_id != id);
        data.collaborators.retain(|_, c| c.profile_id != id);
        data.mutations += 1;
        Ok(())
    }
}

impl NoteStore for MemoryClient {
    fn insert_note(&self, profile_id: ProfileId, new: &NewNote) -> StoreResult<Note> {
        let mut data = self.lock()?;
        data.take_failure("note_insert")?;

        let user_id = self.user_id();
        if new.author_id != user_id {
            return Err(StoreError::Denied);
        }
        let readable = data
            .profiles
            .get(&profile_id)
            .is_some_and(|profile| data.can_read(profile, user_id));
        if !readable {
            return Err(StoreError::Denied);
        }

        let created_at = data.next_ts();
        let note = Note {
            id: Uuid::new_v4(),
            author_id: new.author_id,
            text: new.text.clone(),
            emotion_type: new.emotion_type,
            created_at: Some(created_at),
        };
        data.notes.insert(note.id, (profile_id, note.clone()));
        data.mutations += 1;
        Ok(note)
    }

    fn list_notes(&self, profile_id: ProfileId) -> StoreResult<Vec<Note>> {
        let mut data = self.lock()?;
        data.take_failure("notes_list")?;

        let user_id = self.user_id();
        let readable = data
            .profiles
            .get(&profile_id)
            .is_some_and(|profile| data.can_read(profile, user_id));
        if !readable {
            return Ok(Vec::new());
        }
        let mut notes: Vec<Note> = data
            .notes
            .values()
            .filter(|(owner, _)| *owner == profile_id)
            .map(|(_, note)| note.clone())
            .collect();
        sort_notes(&mut notes);
        Ok(notes)
    }

    fn delete_note(&self, id: NoteId) -> StoreResult<()> {
        let mut data = self.lock()?;
        data.take_failure("note_delete")?;

        let user_id = self.user_id();
        let authored = data
            .notes
            .get(&id)
            .is_some_and(|(_, note)| note.author_id == user_id);
        if authored {
            data.notes.remove(&id);
            data.mutations += 1;
        }
        Ok(())
    }
}

impl CollaboratorStore for MemoryClient {
    fn insert(&self, new: &NewCollaborator) -> StoreResult<Collaborator> {
        let mut data = self.lock()?;
        data.take_failure("collab_insert")?;

        let user_id = self.user_id();
        if new.user_id != user_id {
            return Err(StoreError::Denied);
        }
        let readable = data
            .profiles
            .get(&new.profile_id)
            .is_some_and(|profile| data.can_read(profile, user_id));
        if !readable {
            return Err(StoreError::Denied);
        }

        let created_at = data.next_ts();
        let collaborator = Collaborator {
            id: Uuid::new_v4(),
            profile_id: new.profile_id,
            user_id: new.user_id,
            display_name: new.display_name.clone(),
            avatar_url: new.avatar_url.clone(),
            created_at,
        };
        data.collaborators
            .insert(collaborator.id, collaborator.clone());
        data.mutations += 1;
        Ok(collaborator)
    }

    fn find_for_user(
        &self,
        profile_id: ProfileId,
        user_id: UserId,
    ) -> StoreResult<Option<Collaborator>> {
        let mut data = self.lock()?;
        data.take_failure("collab_find")?;

        Ok(data
            .collaborators
            .values()
            .find(|c| c.profile_id == profile_id && c.user_id == user_id)
            .cloned())
    }

    fn list_for_profile(&self, profile_id: ProfileId) -> StoreResult<Vec<Collaborator>> {
        let mut data = self.lock()?;
        data.take_failure("collab_list")?;

        let mut rows: Vec<Collaborator> = data
            .collaborators
            .values()
            .filter(|c| c.profile_id == profile_id)
            .cloned()
            .collect();
        rows.sort_by_key(|c| c.created_at);
        Ok(rows)
    }

    fn profile_ids_for_user(&self, user_id: UserId) -> StoreResult<Vec<ProfileId>> {
        let mut data = self.lock()?;
        data.take_failure("collab_ids")?;

        Ok(data
            .collaborators
            .values()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.profile_id)
            .collect())
    }

    fn remove(&self, id: CollaboratorId) -> StoreResult<()> {
        let mut data = self.lock()?;
        data.take_failure("collab_remove")?;

        let user_id = self.user_id();
        let owner_removing = data.collaborators.get(&id).is_some_and(|c| {
            data.profiles
                .get(&c.profile_id)
                .is_some_and(|profile| profile.owner_id == user_id)
        });
        if owner_removing {
            data.collaborators.remove(&id);
            data.mutations += 1;
        }
        Ok(())
    }

    fn remove_all_for_profile(&self, profile_id: ProfileId) -> StoreResult<()> {
        let mut data = self.lock()?;
        data.take_failure("collab_remove_all")?;

        let user_id = self.user_id();
        let owned = data
            .profiles
            .get(&profile_id)
            .is_some_and(|profile| profile.owner_id == user_id);
        if !owned {
            return Ok(());
        }
        data.collaborators.retain(|_, c| c.profile_id != profile_id);
        data.mutations += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryBackend;
    use crate::model::identity::{AuthUser, Identity};
    use crate::model::profile::{NewProfile, ProfileDraft, Visibility};
    use crate::store::profile_store::ProfileStore;
    use crate::store::StoreError;
    use uuid::Uuid;

    fn auth_identity() -> Identity {
        Identity::Authenticated(AuthUser {
            id: Uuid::new_v4(),
            display_name: None,
            email: None,
            avatar_url: None,
        })
    }

    fn new_profile(owner: &Identity, visibility: Visibility) -> NewProfile {
        NewProfile {
            owner_id: owner.user_id(),
            draft: ProfileDraft {
                name: "Alex".to_string(),
                description: None,
                visibility,
                image_data: Some("blob".to_string()),
            },
        }
    }

    #[test]
    fn private_profile_is_invisible_to_strangers() {
        let backend = MemoryBackend::new();
        let owner = auth_identity();
        let stranger = auth_identity();

        let created = backend
            .client(owner.clone())
            .insert_profile(&new_profile(&owner, Visibility::Private))
            .unwrap();

        let visible = backend.client(stranger).fetch_profile(created.id).unwrap();
        assert!(visible.is_none());

        let for_owner = backend
            .client(owner)
            .fetch_profile(created.id)
            .unwrap()
            .unwrap();
        // Select-by-id omits the image payload.
        assert_eq!(for_owner.image_data, None);
    }

    #[test]
    fn non_owner_delete_affects_zero_rows() {
        let backend = MemoryBackend::new();
        let owner = auth_identity();
        let stranger = auth_identity();

        let created = backend
            .client(owner.clone())
            .insert_profile(&new_profile(&owner, Visibility::Public))
            .unwrap();

        backend.client(stranger).delete_profile(created.id).unwrap();
        assert!(backend.profile_row(created.id).is_some());
    }

    #[test]
    fn injected_failure_fires_exactly_once() {
        let backend = MemoryBackend::new();
        let owner = auth_identity();
        let client = backend.client(owner.clone());

        backend.fail_once("profiles_list_owned");
        let err = client.list_owned(owner.user_id()).unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert!(client.list_owned(owner.user_id()).unwrap().is_empty());
    }

    #[test]
    fn timestamps_are_strictly_increasing() {
        let backend = MemoryBackend::new();
        let owner = auth_identity();
        let client = backend.client(owner.clone());

        let first = client
            .insert_profile(&new_profile(&owner, Visibility::Private))
            .unwrap();
        let second = client
            .insert_profile(&new_profile(&owner, Visibility::Private))
            .unwrap();
        assert!(second.created_at > first.created_at);
    }
}
