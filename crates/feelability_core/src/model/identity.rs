//! Caller identity: authenticated user or ephemeral guest.
//!
//! # Responsibility
//! - Carry the identity every session operation is scoped to.
//! - State the guest contract in one place: guest writes never reach a
//!   remote store or the local cache.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an authenticated user.
pub type UserId = Uuid;

/// Authenticated account details as provided by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

impl AuthUser {
    /// Display name used when enrolling as a collaborator: display name,
    /// else email, else a fixed placeholder.
    pub fn collaborator_display_name(&self) -> String {
        self.display_name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| "Anonymous".to_string())
    }
}

/// Ephemeral guest visitor. The id is synthesized per session so note
/// authorship stays uniformly typed; it never appears in any store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestVisitor {
    pub id: UserId,
    pub seed: u32,
}

/// The identity a session runs as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Guest(GuestVisitor),
    Authenticated(AuthUser),
}

impl Identity {
    /// Creates a guest identity with the given placeholder-image seed.
    pub fn guest(seed: u32) -> Self {
        Self::Guest(GuestVisitor {
            id: Uuid::new_v4(),
            seed,
        })
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest(_))
    }

    /// The acting user id, guest or authenticated.
    pub fn user_id(&self) -> UserId {
        match self {
            Self::Guest(visitor) => visitor.id,
            Self::Authenticated(user) => user.id,
        }
    }

    /// The authenticated account, if any.
    pub fn auth_user(&self) -> Option<&AuthUser> {
        match self {
            Self::Guest(_) => None,
            Self::Authenticated(user) => Some(user),
        }
    }
}
