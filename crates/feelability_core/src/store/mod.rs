//! Remote-store contracts.
//!
//! # Responsibility
//! - Define the object-safe traits the synchronizers call into.
//! - Keep the error surface small: the engine performs no authorization of
//!   its own beyond what it is permitted to read.
//!
//! # Invariants
//! - Store handles are already scoped to the calling identity (the hosted
//!   client carries the auth session).
//! - Reads never distinguish forbidden from not-found: both collapse to
//!   row absence.

pub mod collaborator_store;
pub mod memory;
pub mod note_store;
pub mod profile_store;

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure surface of a remote-store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Transport or backend failure; the message is opaque to the engine.
    Backend(String),
    /// The store's access policy rejected a write.
    Denied,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(message) => write!(f, "store backend failure: {message}"),
            Self::Denied => write!(f, "store policy denied the operation"),
        }
    }
}

impl Error for StoreError {}
