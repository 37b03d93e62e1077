use feelability_core::{
    AuthUser, CacheStore, EmotionType, EntryParams, Identity, InteractionKind, MemoryBackend,
    ProfileDraft, Session, SessionError, SessionStores, Visibility,
};
use std::time::Duration;
use uuid::Uuid;

fn auth(name: &str) -> Identity {
    Identity::Authenticated(AuthUser {
        id: Uuid::new_v4(),
        display_name: Some(name.to_string()),
        email: None,
        avatar_url: None,
    })
}

fn session(backend: &MemoryBackend, identity: &Identity) -> Session {
    let client = backend.client(identity.clone());
    Session::start(
        identity.clone(),
        SessionStores {
            profiles: client.clone(),
            notes: client.clone(),
            collaborators: client,
        },
        CacheStore::in_memory().unwrap(),
        EntryParams::default(),
    )
}

fn with_profile(backend: &MemoryBackend, identity: &Identity) -> Session {
    let mut s = session(backend, identity);
    s.create_profile(&ProfileDraft {
        name: "Alex".to_string(),
        description: None,
        visibility: Visibility::Private,
        image_data: None,
    })
    .unwrap();
    s
}

#[test]
fn finishing_an_interaction_increments_by_one_and_persists() {
    let backend = MemoryBackend::new();
    let owner = auth("owner");
    let mut s = with_profile(&backend, &owner);
    let profile = s.state().active_profile_id().unwrap();

    assert!(s.begin_interaction(InteractionKind::Punch));
    assert_eq!(s.state().animating(), Some(InteractionKind::Punch));
    assert_eq!(s.finish_interaction(), Some(1));

    assert_eq!(s.state().active_profile().unwrap().punch_count, 1);
    assert_eq!(backend.profile_row(profile).unwrap().punch_count, 1);
    assert_eq!(s.state().animating(), None);
}

#[test]
fn interactions_are_mutually_exclusive_while_animating() {
    let backend = MemoryBackend::new();
    let owner = auth("owner");
    let mut s = with_profile(&backend, &owner);

    assert!(s.begin_interaction(InteractionKind::Kiss));
    assert!(!s.begin_interaction(InteractionKind::Punch));
    assert!(!s.begin_interaction(InteractionKind::Hug));

    let err = s.add_note("gated", EmotionType::Feelings).unwrap_err();
    assert!(matches!(err, SessionError::Busy));

    let active = s.state().active_profile_id().unwrap();
    let err = s.switch_profile(active).unwrap_err();
    assert!(matches!(err, SessionError::Busy));

    // Counters untouched by the gated invocations.
    assert_eq!(s.finish_interaction(), Some(1));
    assert_eq!(s.state().active_profile().unwrap().punch_count, 0);
    assert_eq!(s.state().active_profile().unwrap().hug_count, 0);
    assert_eq!(s.state().active_profile().unwrap().kiss_count, 1);

    assert!(s.begin_interaction(InteractionKind::Hug));
    assert_eq!(s.finish_interaction(), Some(1));
}

#[test]
fn counter_persist_failure_is_lossy_by_design() {
    let backend = MemoryBackend::new();
    let owner = auth("owner");
    let mut s = with_profile(&backend, &owner);
    let profile = s.state().active_profile_id().unwrap();

    backend.fail_once("counter_set");
    assert!(s.begin_interaction(InteractionKind::Hug));
    assert_eq!(s.finish_interaction(), Some(1));

    // Local state keeps the increment; the remote write is simply lost.
    assert_eq!(s.state().active_profile().unwrap().hug_count, 1);
    assert_eq!(backend.profile_row(profile).unwrap().hug_count, 0);
}

#[test]
fn begin_is_a_no_op_without_an_active_profile() {
    let backend = MemoryBackend::new();
    let owner = auth("owner");
    let mut s = session(&backend, &owner);

    assert!(!s.begin_interaction(InteractionKind::Punch));
    assert_eq!(s.finish_interaction(), None);
}

#[test]
fn animation_durations_match_the_product_timings() {
    assert_eq!(
        InteractionKind::Kiss.animation(),
        Duration::from_millis(800)
    );
    assert_eq!(InteractionKind::Hug.animation(), Duration::from_millis(1000));
    assert_eq!(
        InteractionKind::Punch.animation(),
        Duration::from_millis(1300)
    );
}
