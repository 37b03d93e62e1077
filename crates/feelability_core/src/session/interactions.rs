//! Punch/hug/kiss interaction counters.
//!
//! # Invariants
//! - The three interactions, note saving, and profile switching are
//!   mutually exclusive; a gated invocation is a no-op.
//! - The counter increments by exactly 1 when the animation finishes.
//! - The persist is fire-and-forget: a failed write is logged and never
//!   rolled back (deliberately lossy).

use crate::model::profile::InteractionKind;
use crate::session::Session;
use log::{debug, warn};

impl Session {
    /// Enters the animating state for one interaction.
    ///
    /// Returns `false` (a no-op) when another interaction, a note save,
    /// or a profile switch is already in flight, or when no profile is
    /// active. The embedding UI should wait `kind.animation()` before
    /// calling [`Session::finish_interaction`].
    pub fn begin_interaction(&mut self, kind: InteractionKind) -> bool {
        if self.state.active_profile_id().is_none() {
            return false;
        }
        let started = self.state.begin_animation(kind);
        if !started {
            debug!("event=interaction module=session status=gated kind={kind:?}");
        }
        started
    }

    /// Ends the animating state: increments the counter locally and, in
    /// authenticated mode, persists the new value.
    ///
    /// Returns the new counter value, or `None` when nothing was
    /// animating.
    pub fn finish_interaction(&mut self) -> Option<u32> {
        let kind = self.state.end_animation()?;
        let profile_id = self.state.active_profile_id()?;
        let value = self.state.bump_interaction(profile_id, kind)?;

        if !self.identity.is_guest() {
            if let Err(err) = self.profile_store.set_counter(profile_id, kind, value) {
                warn!(
                    "event=interaction module=session status=degraded kind={kind:?} profile={profile_id} error={err}"
                );
            }
        }

        Some(value)
    }
}
