//! Notes synchronizer for the active profile.
//!
//! # Responsibility
//! - Keep the notes list of exactly one active profile in sync: cached
//!   paint, authoritative reload, optimistic add/delete.
//!
//! # Invariants
//! - Guest notes never leave memory.
//! - A create only mutates local state after the remote insert succeeds.
//! - A delete is optimistic; on remote failure the list and the counter
//!   return to their exact pre-delete values.
//! - Loads for a selection that changed while the fetch was outstanding
//!   are discarded via the generation counter, not applied.

use crate::model::note::{sort_notes, EmotionType, NewNote, Note, NoteId};
use crate::model::now_epoch_ms;
use crate::model::profile::ProfileId;
use crate::session::{Session, SessionError, SessionResult};
use log::{debug, info, warn};
use uuid::Uuid;

impl Session {
    /// Loads the active profile's notes: cached paint first, then the
    /// authoritative fetch. Fetch failures keep the cached view and are
    /// surfaced only to logs.
    pub fn load_notes(&mut self) -> SessionResult<()> {
        let Some(profile_id) = self.state.active_profile_id() else {
            self.state.set_notes(Vec::new());
            return Ok(());
        };
        if self.identity.is_guest() {
            // Guest notes exist only in memory; there is nothing to fetch.
            return Ok(());
        }
        if self.state.note_delete_pending(profile_id) {
            // A delete is still settling; do not clobber the optimistic list.
            return Ok(());
        }
        let user = self.require_auth()?;
        let generation = self.state.generation();

        if let Some(cached) = self.cache.read_notes(user.id, profile_id) {
            self.state.set_notes(cached);
        }

        let mut notes = match self.note_store.list_notes(profile_id) {
            Ok(notes) => notes,
            Err(err) => {
                warn!(
                    "event=notes_load module=session status=error profile={profile_id} error={err}"
                );
                return Ok(());
            }
        };

        if self.state.generation() != generation {
            debug!(
                "event=notes_load module=session status=stale profile={profile_id} generation={generation}"
            );
            return Ok(());
        }

        sort_notes(&mut notes);
        self.cache.write_notes(user.id, profile_id, &notes);
        info!(
            "event=notes_load module=session status=ok profile={profile_id} count={}",
            notes.len()
        );
        self.state.set_notes(notes);
        Ok(())
    }

    /// Adds a note to the active profile.
    ///
    /// Guest mode synthesizes the note locally; authenticated mode inserts
    /// remotely first and only then mutates local state, the cache, and
    /// the profile's note-count mirror.
    pub fn add_note(&mut self, text: &str, emotion_type: EmotionType) -> SessionResult<Note> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyNote);
        }
        let profile_id = self
            .state
            .active_profile_id()
            .ok_or(SessionError::NoActiveProfile)?;
        if !self.state.begin_note_save() {
            return Err(SessionError::Busy);
        }

        let result = self.add_note_inner(profile_id, text, emotion_type);
        self.state.end_note_save();
        result
    }

    fn add_note_inner(
        &mut self,
        profile_id: ProfileId,
        text: &str,
        emotion_type: EmotionType,
    ) -> SessionResult<Note> {
        if self.identity.is_guest() {
            let note = Note {
                id: Uuid::new_v4(),
                author_id: self.identity.user_id(),
                text: text.to_string(),
                emotion_type,
                created_at: Some(now_epoch_ms()),
            };
            self.state.push_note_sorted(note.clone());
            self.state.increment_notes_count(profile_id);
            return Ok(note);
        }

        let user = self.require_auth()?;
        let created = self.note_store.insert_note(
            profile_id,
            &NewNote {
                author_id: user.id,
                text: text.to_string(),
                emotion_type,
            },
        )?;

        self.state.push_note_sorted(created.clone());
        self.cache.write_notes(user.id, profile_id, self.state.notes());
        if let Some(count) = self.state.increment_notes_count(profile_id) {
            if let Err(err) = self.profile_store.set_notes_count(profile_id, count) {
                warn!(
                    "event=note_add module=session status=degraded stage=count profile={profile_id} error={err}"
                );
            }
        }

        info!("event=note_add module=session status=ok profile={profile_id}");
        Ok(created)
    }

    /// Deletes a note from the active profile's list.
    ///
    /// Only the author may delete (guests bypass the check — there is no
    /// stable authorship in guest mode). The removal is optimistic; a
    /// remote failure rolls back both the list and the counter.
    pub fn delete_note(&mut self, id: NoteId) -> SessionResult<()> {
        let profile_id = self
            .state
            .active_profile_id()
            .ok_or(SessionError::NoActiveProfile)?;
        let Some(note) = self.state.notes().iter().find(|n| n.id == id).cloned() else {
            // Unknown id: silent no-op, matching the remote store's view.
            return Ok(());
        };

        if self.identity.is_guest() {
            self.state.remove_note(id);
            self.state.decrement_notes_count(profile_id);
            return Ok(());
        }

        let user = self.require_auth()?;
        if note.author_id != user.id {
            return Err(SessionError::NotAuthor);
        }
        if !self.state.begin_note_delete(profile_id) {
            return Err(SessionError::Busy);
        }

        let notes_before = self.state.notes().to_vec();
        let count_before = self
            .state
            .profile(profile_id)
            .map(|p| p.notes_count)
            .unwrap_or(0);

        self.state.remove_note(id);
        self.state.decrement_notes_count(profile_id);
        self.cache.write_notes(user.id, profile_id, self.state.notes());

        match self.note_store.delete_note(id) {
            Ok(()) => {
                let count = self
                    .state
                    .profile(profile_id)
                    .map(|p| p.notes_count)
                    .unwrap_or(0);
                if let Err(err) = self.profile_store.set_notes_count(profile_id, count) {
                    warn!(
                        "event=note_delete module=session status=degraded stage=count profile={profile_id} error={err}"
                    );
                }
                self.state.end_note_delete(profile_id);
                info!("event=note_delete module=session status=ok profile={profile_id}");
                Ok(())
            }
            Err(err) => {
                self.state.set_notes(notes_before.clone());
                self.state.set_notes_count(profile_id, count_before);
                self.cache.write_notes(user.id, profile_id, &notes_before);
                self.state.end_note_delete(profile_id);
                warn!(
                    "event=note_delete module=session status=rollback profile={profile_id} error={err}"
                );
                Err(err.into())
            }
        }
    }
}
