//! Per-identity local cache over the SQLite key/value table.
//!
//! # Responsibility
//! - Mirror the last known profile list, image blobs, per-profile notes,
//!   and the active-profile pointer so the UI can paint before a network
//!   roundtrip resolves.
//!
//! # Invariants
//! - Entries are namespaced by authenticated user id; no scope is ever
//!   shared across identities. Guest sessions never touch this store.
//! - Reads are best-effort: malformed or missing entries are misses,
//!   never hard errors.
//! - Writes are best-effort: a failure is logged and otherwise ignored;
//!   in-memory state stays authoritative for the session.

use crate::db::{open_cache_db, open_cache_db_in_memory, DbResult};
use crate::model::identity::UserId;
use crate::model::note::Note;
use crate::model::profile::{Profile, ProfileId};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

const KEY_PROFILES: &str = "profiles";
const KEY_PROFILE_IMAGES: &str = "profile_images";
const KEY_ACTIVE_PROFILE: &str = "active_profile";

/// Namespaced key/value mirror of the last known server state.
pub struct CacheStore {
    conn: Connection,
}

impl CacheStore {
    /// Opens a file-backed cache store.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self {
            conn: open_cache_db(path)?,
        })
    }

    /// Opens an in-memory cache store (tests, demo binaries).
    pub fn in_memory() -> DbResult<Self> {
        Ok(Self {
            conn: open_cache_db_in_memory()?,
        })
    }

    pub fn read_profiles(&self, user: UserId) -> Option<Vec<Profile>> {
        self.read_json(user, KEY_PROFILES)
    }

    pub fn write_profiles(&self, user: UserId, profiles: &[Profile]) {
        self.write_json(user, KEY_PROFILES, &profiles);
    }

    pub fn read_images(&self, user: UserId) -> Option<BTreeMap<ProfileId, String>> {
        self.read_json(user, KEY_PROFILE_IMAGES)
    }

    pub fn write_images(&self, user: UserId, images: &BTreeMap<ProfileId, String>) {
        self.write_json(user, KEY_PROFILE_IMAGES, images);
    }

    pub fn read_notes(&self, user: UserId, profile_id: ProfileId) -> Option<Vec<Note>> {
        self.read_json(user, &notes_key(profile_id))
    }

    pub fn write_notes(&self, user: UserId, profile_id: ProfileId, notes: &[Note]) {
        self.write_json(user, &notes_key(profile_id), &notes);
    }

    pub fn remove_notes(&self, user: UserId, profile_id: ProfileId) {
        self.remove(user, &notes_key(profile_id));
    }

    pub fn read_active_profile(&self, user: UserId) -> Option<ProfileId> {
        let raw: String = self.read_json(user, KEY_ACTIVE_PROFILE)?;
        match Uuid::parse_str(&raw) {
            Ok(id) => Some(id),
            Err(_) => {
                warn!(
                    "event=cache_read module=cache status=miss key={KEY_ACTIVE_PROFILE} reason=malformed_id"
                );
                None
            }
        }
    }

    pub fn write_active_profile(&self, user: UserId, profile_id: ProfileId) {
        self.write_json(user, KEY_ACTIVE_PROFILE, &profile_id.to_string());
    }

    pub fn clear_active_profile(&self, user: UserId) {
        self.remove(user, KEY_ACTIVE_PROFILE);
    }

    fn read_json<T: DeserializeOwned>(&self, user: UserId, key: &str) -> Option<T> {
        let raw = self.read_raw(user, key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                // A corrupt entry is a miss, never an error.
                warn!("event=cache_read module=cache status=miss key={key} reason=parse error={err}");
                None
            }
        }
    }

    fn write_json<T: Serialize>(&self, user: UserId, key: &str, value: &T) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("event=cache_write module=cache status=error key={key} error={err}");
                return;
            }
        };
        self.write_raw(user, key, &payload);
    }

    fn read_raw(&self, user: UserId, key: &str) -> Option<String> {
        let result = self
            .conn
            .query_row(
                "SELECT value FROM cache_entries WHERE scope = ?1 AND key = ?2;",
                params![scope_for(user), key],
                |row| row.get::<_, String>(0),
            )
            .optional();
        match result {
            Ok(value) => value,
            Err(err) => {
                warn!("event=cache_read module=cache status=error key={key} error={err}");
                None
            }
        }
    }

    fn write_raw(&self, user: UserId, key: &str, value: &str) {
        let result = self.conn.execute(
            "INSERT INTO cache_entries (scope, key, value, updated_at)
             VALUES (?1, ?2, ?3, strftime('%s', 'now') * 1000)
             ON CONFLICT (scope, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![scope_for(user), key, value],
        );
        if let Err(err) = result {
            warn!("event=cache_write module=cache status=error key={key} error={err}");
        }
    }

    fn remove(&self, user: UserId, key: &str) {
        let result = self.conn.execute(
            "DELETE FROM cache_entries WHERE scope = ?1 AND key = ?2;",
            params![scope_for(user), key],
        );
        if let Err(err) = result {
            warn!("event=cache_write module=cache status=error key={key} error={err}");
        }
    }
}

fn scope_for(user: UserId) -> String {
    format!("u:{user}")
}

fn notes_key(profile_id: ProfileId) -> String {
    format!("notes:{profile_id}")
}
