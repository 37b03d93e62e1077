//! Domain model shared by the synchronizers and store contracts.
//!
//! # Responsibility
//! - Define the canonical records mirrored from the remote stores.
//! - Keep validation and ordering rules next to the data they govern.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - `notes_count` mirrors the number of live notes for a profile; it is
//!   maintained by paired writes, not computed by storage.

pub mod collaborator;
pub mod identity;
pub mod note;
pub mod profile;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
