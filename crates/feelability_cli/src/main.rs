//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `feelability_core` wiring
//!   end-to-end against the in-memory backend.
//! - Keep output deterministic for quick local sanity checks.

use feelability_core::{
    CacheStore, EmotionType, EntryParams, Identity, InteractionKind, MemoryBackend, Session,
    SessionStores,
};

fn main() {
    println!("feelability_core version={}", feelability_core::core_version());

    let backend = MemoryBackend::new();
    let client = backend.client(Identity::guest(7));
    let cache = match CacheStore::in_memory() {
        Ok(cache) => cache,
        Err(err) => {
            eprintln!("cache bootstrap failed: {err}");
            std::process::exit(1);
        }
    };

    let mut session = Session::start(
        Identity::guest(7),
        SessionStores {
            profiles: client.clone(),
            notes: client.clone(),
            collaborators: client,
        },
        cache,
        EntryParams::from_query("guest=1"),
    );

    if session.begin_interaction(InteractionKind::Punch) {
        let _ = session.finish_interaction();
    }
    if let Err(err) = session.add_note("smoke note", EmotionType::Feelings) {
        eprintln!("guest note failed: {err}");
        std::process::exit(1);
    }

    let profile = session.state().active_profile().map(|p| {
        (
            p.name.clone(),
            p.punch_count,
            p.notes_count,
            session.state().notes().len(),
        )
    });
    match profile {
        Some((name, punches, notes_count, notes_len)) => println!(
            "guest profile={name} punch_count={punches} notes_count={notes_count} notes={notes_len}"
        ),
        None => {
            eprintln!("guest session has no active profile");
            std::process::exit(1);
        }
    }
    println!("remote mutations={}", backend.mutation_count());
}
