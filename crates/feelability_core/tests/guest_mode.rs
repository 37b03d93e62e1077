use feelability_core::{
    CacheStore, EmotionType, EntryParams, Identity, InteractionKind, MemoryBackend, Session,
    SessionStores,
};

fn guest_session(backend: &MemoryBackend, cache: CacheStore) -> Session {
    let identity = Identity::guest(42);
    let client = backend.client(identity.clone());
    Session::start(
        identity,
        SessionStores {
            profiles: client.clone(),
            notes: client.clone(),
            collaborators: client,
        },
        cache,
        EntryParams::from_query("guest=1"),
    )
}

#[test]
fn guest_session_is_seeded_with_a_synthetic_profile() {
    let backend = MemoryBackend::new();
    let s = guest_session(&backend, CacheStore::in_memory().unwrap());

    let profile = s.state().active_profile().unwrap();
    assert_eq!(profile.name, "John Doe");
    assert_eq!(profile.description.as_deref(), Some("Guest mode"));
    assert!(s
        .state()
        .image_for(profile.id)
        .unwrap()
        .starts_with("https://i.pravatar.cc/900?img="));
}

#[test]
fn guest_actions_never_reach_the_remote_store() {
    let backend = MemoryBackend::new();
    let mut s = guest_session(&backend, CacheStore::in_memory().unwrap());

    s.load_profiles().unwrap();
    let note = s.add_note("ephemeral", EmotionType::Anger).unwrap();
    assert!(s.begin_interaction(InteractionKind::Punch));
    assert_eq!(s.finish_interaction(), Some(1));
    s.delete_note(note.id).unwrap();

    assert_eq!(backend.mutation_count(), 0);
}

#[test]
fn guest_notes_and_counters_live_only_in_memory() {
    let backend = MemoryBackend::new();
    let mut s = guest_session(&backend, CacheStore::in_memory().unwrap());

    s.add_note("one", EmotionType::Feelings).unwrap();
    s.add_note("two", EmotionType::Appreciation).unwrap();
    assert!(s.begin_interaction(InteractionKind::Kiss));
    assert_eq!(s.finish_interaction(), Some(1));

    let profile = s.state().active_profile().unwrap();
    assert_eq!(profile.notes_count, 2);
    assert_eq!(profile.kiss_count, 1);
    assert_eq!(s.state().notes()[0].text, "two");

    // A fresh session discards everything.
    let next = guest_session(&backend, CacheStore::in_memory().unwrap());
    assert!(next.state().notes().is_empty());
    assert_eq!(next.state().active_profile().unwrap().notes_count, 0);
}

#[test]
fn guest_delete_skips_the_author_check() {
    let backend = MemoryBackend::new();
    let mut s = guest_session(&backend, CacheStore::in_memory().unwrap());

    let note = s.add_note("gone soon", EmotionType::Feelings).unwrap();
    s.delete_note(note.id).unwrap();
    assert!(s.state().notes().is_empty());
    assert_eq!(s.state().active_profile().unwrap().notes_count, 0);
}

#[test]
fn guest_sessions_never_touch_the_cache() {
    let backend = MemoryBackend::new();
    let cache_dir = tempfile::tempdir().unwrap();
    let cache_path = cache_dir.path().join("cache.sqlite3");

    let mut s = guest_session(&backend, CacheStore::open(&cache_path).unwrap());
    s.load_profiles().unwrap();
    s.add_note("ephemeral", EmotionType::Feelings).unwrap();
    drop(s);

    let conn = rusqlite::Connection::open(&cache_path).unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM cache_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 0);
}
