//! View-state container: the single source of truth for the session.
//!
//! # Responsibility
//! - Hold the merged profile list, the active-profile pointer, the active
//!   profile's notes, resolved images, and the single-flight gates.
//! - Expose mutations only as the enumerated transitions below.
//!
//! # Invariants
//! - `notes_count` decrements are floored at zero.
//! - `active_generation` increases on every active-profile change; stale
//!   results carrying an older generation must be discarded, not applied.
//! - At most one of {animated interaction, note save, profile switch} is
//!   in flight at a time.

use crate::model::note::{sort_notes, Note, NoteId};
use crate::model::profile::{InteractionKind, Profile, ProfileId};
use std::collections::{BTreeMap, BTreeSet};

/// Mutable view state behind the session facade.
#[derive(Default)]
pub struct ViewState {
    profiles: Vec<Profile>,
    images: BTreeMap<ProfileId, String>,
    active_profile_id: Option<ProfileId>,
    active_generation: u64,
    notes: Vec<Note>,
    access_denied: bool,
    animating: Option<InteractionKind>,
    note_saving: bool,
    switching_profile: bool,
    notes_delete_pending: BTreeSet<ProfileId>,
}

impl ViewState {
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn profile(&self, id: ProfileId) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn active_profile_id(&self) -> Option<ProfileId> {
        self.active_profile_id
    }

    pub fn active_profile(&self) -> Option<&Profile> {
        self.active_profile_id.and_then(|id| self.profile(id))
    }

    /// Generation of the current active-profile selection.
    pub fn generation(&self) -> u64 {
        self.active_generation
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn images(&self) -> &BTreeMap<ProfileId, String> {
        &self.images
    }

    pub fn image_for(&self, id: ProfileId) -> Option<&str> {
        self.images.get(&id).map(String::as_str)
    }

    pub fn access_denied(&self) -> bool {
        self.access_denied
    }

    pub fn animating(&self) -> Option<InteractionKind> {
        self.animating
    }

    /// True while any single-flight operation is in progress.
    pub fn is_busy(&self) -> bool {
        self.animating.is_some() || self.note_saving || self.switching_profile
    }

    pub fn note_delete_pending(&self, profile_id: ProfileId) -> bool {
        self.notes_delete_pending.contains(&profile_id)
    }

    // --- transitions -----------------------------------------------------

    pub(crate) fn replace_profiles(&mut self, profiles: Vec<Profile>) {
        self.profiles = profiles;
    }

    /// Replaces a profile by id, or prepends it when absent.
    pub(crate) fn set_profile(&mut self, profile: Profile) {
        match self.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(slot) => *slot = profile,
            None => self.profiles.insert(0, profile),
        }
    }

    pub(crate) fn remove_profile(&mut self, id: ProfileId) -> bool {
        let before = self.profiles.len();
        self.profiles.retain(|p| p.id != id);
        self.images.remove(&id);
        self.profiles.len() != before
    }

    /// Selects the active profile and invalidates in-flight loads for the
    /// previous selection.
    pub(crate) fn set_active(&mut self, id: Option<ProfileId>) -> u64 {
        self.active_profile_id = id;
        self.active_generation += 1;
        self.active_generation
    }

    pub(crate) fn set_images(&mut self, images: BTreeMap<ProfileId, String>) {
        self.images = images;
    }

    pub(crate) fn set_image(&mut self, id: ProfileId, data: String) {
        self.images.insert(id, data);
    }

    pub(crate) fn set_notes(&mut self, notes: Vec<Note>) {
        self.notes = notes;
    }

    pub(crate) fn push_note_sorted(&mut self, note: Note) {
        self.notes.push(note);
        sort_notes(&mut self.notes);
    }

    pub(crate) fn remove_note(&mut self, id: NoteId) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        self.notes.len() != before
    }

    pub(crate) fn set_access_denied(&mut self, denied: bool) {
        self.access_denied = denied;
    }

    pub(crate) fn bump_interaction(
        &mut self,
        id: ProfileId,
        kind: InteractionKind,
    ) -> Option<u32> {
        let profile = self.profiles.iter_mut().find(|p| p.id == id)?;
        profile.bump_counter(kind);
        Some(profile.counter(kind))
    }

    pub(crate) fn increment_notes_count(&mut self, id: ProfileId) -> Option<u32> {
        let profile = self.profiles.iter_mut().find(|p| p.id == id)?;
        profile.notes_count += 1;
        Some(profile.notes_count)
    }

    /// Floored at zero.
    pub(crate) fn decrement_notes_count(&mut self, id: ProfileId) -> Option<u32> {
        let profile = self.profiles.iter_mut().find(|p| p.id == id)?;
        profile.notes_count = profile.notes_count.saturating_sub(1);
        Some(profile.notes_count)
    }

    pub(crate) fn set_notes_count(&mut self, id: ProfileId, value: u32) {
        if let Some(profile) = self.profiles.iter_mut().find(|p| p.id == id) {
            profile.notes_count = value;
        }
    }

    // --- single-flight gates ---------------------------------------------

    pub(crate) fn begin_animation(&mut self, kind: InteractionKind) -> bool {
        if self.is_busy() {
            return false;
        }
        self.animating = Some(kind);
        true
    }

    pub(crate) fn end_animation(&mut self) -> Option<InteractionKind> {
        self.animating.take()
    }

    pub(crate) fn begin_note_save(&mut self) -> bool {
        if self.is_busy() {
            return false;
        }
        self.note_saving = true;
        true
    }

    pub(crate) fn end_note_save(&mut self) {
        self.note_saving = false;
    }

    pub(crate) fn begin_profile_switch(&mut self) -> bool {
        if self.is_busy() {
            return false;
        }
        self.switching_profile = true;
        true
    }

    pub(crate) fn end_profile_switch(&mut self) {
        self.switching_profile = false;
    }

    pub(crate) fn begin_note_delete(&mut self, profile_id: ProfileId) -> bool {
        self.notes_delete_pending.insert(profile_id)
    }

    pub(crate) fn end_note_delete(&mut self, profile_id: ProfileId) {
        self.notes_delete_pending.remove(&profile_id);
    }
}
