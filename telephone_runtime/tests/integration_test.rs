//! Integration tests for telephone_runtime.
//!
//! All tests use temporary directories for isolation.

use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;

use telephone_engine::events::{EventEnvelope, GameEvent};
use telephone_engine::state::create_initial_state;
use telephone_engine::{Artifact, EngineError, Participant, GROUP_ORDER};

use telephone_runtime::event_store::EventStore;
use telephone_runtime::proto_bridge::{kernel_to_proto, proto_to_kernel};
use telephone_runtime::replay;
use telephone_runtime::session::{Session, SessionError, SharedSession, TurnDraft};
use telephone_runtime::snapshot;

fn draft(author: Participant, prompt: &str) -> TurnDraft {
    TurnDraft {
        author,
        prompt: prompt.to_string(),
        artifact: Artifact::new(format!("img:{prompt}")),
    }
}

/// Play `rounds` full rounds, every group in order.
fn play_rounds(session: &mut Session, rounds: usize) {
    for round in 1..=rounds {
        for group in GROUP_ORDER {
            session
                .submit_current(draft(group, &format!("{} round {round}", group.as_str())))
                .expect("submit");
        }
    }
}

// ─────────────────────────────────────────────────────────────
// Test 1: full_game_replays_to_live_hash
// ─────────────────────────────────────────────────────────────

#[test]
fn full_game_replays_to_live_hash() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(dir.path(), "class", 5).unwrap();
    play_rounds(&mut session, 5);

    assert!(session.state().is_finished());
    assert_eq!(session.current_sequence(), 25);

    let events = session.events().unwrap();
    let hash = replay::verify_determinism(&events).unwrap();
    assert_eq!(hash, session.current_hash());

    let (state, replayed) = session.replay_full().unwrap();
    assert_eq!(replayed, hash);
    assert_eq!(&state, session.state());
}

// ─────────────────────────────────────────────────────────────
// Test 2: log_roundtrip_through_protobuf
// ─────────────────────────────────────────────────────────────

#[test]
fn log_roundtrip_through_protobuf() {
    let dir = tempfile::tempdir().unwrap();
    let events = {
        let mut session = Session::open(dir.path(), "class", 0).unwrap();
        play_rounds(&mut session, 2);
        session.reset().unwrap();
        play_rounds(&mut session, 1);
        session.events().unwrap()
    };
    assert_eq!(events.len(), 16);
    assert_eq!(events[10].event, GameEvent::Reset);

    let store = EventStore::open(&dir.path().join("class").join("events.log")).unwrap();
    let loaded: Vec<EventEnvelope> = store
        .load_all_events()
        .unwrap()
        .iter()
        .map(|p| proto_to_kernel(p).unwrap())
        .collect();
    assert_eq!(loaded, events);
    assert!(events
        .iter()
        .all(|e| proto_to_kernel(&kernel_to_proto(e)).unwrap() == *e));
}

// ─────────────────────────────────────────────────────────────
// Test 3: reopen_restores_state
// ─────────────────────────────────────────────────────────────

#[test]
fn reopen_restores_state() {
    let dir = tempfile::tempdir().unwrap();
    let live = {
        let mut session = Session::open(dir.path(), "class", 5).unwrap();
        play_rounds(&mut session, 2);
        session.submit_current(draft(Participant::Group1, "extra")).unwrap();
        session.current_hash()
    };

    // recovered from snapshot 10 plus the tail of the log
    let restored = Session::open(dir.path(), "class", 5).unwrap();
    assert_eq!(
        snapshot::list_snapshots(&restored.snapshots_dir()).unwrap(),
        vec![5, 10]
    );
    assert_eq!(restored.current_sequence(), 11);
    assert_eq!(restored.current_hash(), live);

    let replayed = replay::rebuild_hash(&restored.events().unwrap()).unwrap();
    assert_eq!(restored.current_hash(), replayed);

    // without snapshots the same log rebuilds the same state
    let snapshots_dir = restored.snapshots_dir();
    drop(restored);
    fs::remove_dir_all(&snapshots_dir).unwrap();
    let from_log = Session::open(dir.path(), "class", 0).unwrap();
    assert_eq!(from_log.current_sequence(), 11);
    assert_eq!(from_log.current_hash(), live);
}

// ─────────────────────────────────────────────────────────────
// Test 4: tampered_snapshot_falls_back
// ─────────────────────────────────────────────────────────────

#[test]
fn tampered_snapshot_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let expected = {
        let mut session = Session::open(dir.path(), "class", 5).unwrap();
        play_rounds(&mut session, 1);
        session.submit_current(draft(Participant::Group3, "next")).unwrap();
        session.current_hash()
    };

    let snap_path = dir
        .path()
        .join("class")
        .join("snapshots")
        .join("snapshot_000005.json");
    let mut doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&snap_path).unwrap()).unwrap();
    doc["hash"] = serde_json::Value::String("0".repeat(64));
    fs::write(&snap_path, doc.to_string()).unwrap();

    let snap = snapshot::load_snapshot(snap_path.parent().unwrap(), 5)
        .unwrap()
        .unwrap();
    assert!(!snapshot::verify_snapshot_hash(&snap));

    let session = Session::open(dir.path(), "class", 5).unwrap();
    assert_eq!(session.current_sequence(), 6);
    assert_eq!(session.current_hash(), expected);
}

// ─────────────────────────────────────────────────────────────
// Test 5: concurrent_submit_has_one_winner
// ─────────────────────────────────────────────────────────────

#[test]
fn concurrent_submit_has_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let shared = Arc::new(SharedSession::new(
        Session::open(dir.path(), "class", 0).unwrap(),
    ));
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = ["first tab", "second tab"]
        .into_iter()
        .map(|prompt| {
            let shared = Arc::clone(&shared);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                shared.submit("project-1", 1, draft(Participant::Group1, prompt))
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(SessionError::Engine(EngineError::StaleSubmission { .. }))
    )));
    assert_eq!(shared.current_sequence().unwrap(), 1);
    assert_eq!(
        shared.with_state(|s| s.projects[0].turns.len()).unwrap(),
        1
    );
}

// ─────────────────────────────────────────────────────────────
// Test 6: sessions_are_isolated
// ─────────────────────────────────────────────────────────────

#[test]
fn sessions_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let mut a = Session::open(dir.path(), "period-1", 0).unwrap();
    let mut b = Session::open(dir.path(), "period-2", 0).unwrap();

    play_rounds(&mut a, 3);
    play_rounds(&mut b, 1);

    assert_eq!(a.current_sequence(), 15);
    assert_eq!(b.current_sequence(), 5);
    assert_ne!(a.current_hash(), b.current_hash());
    assert_eq!(a.session_id(), "period-1");
}

// ─────────────────────────────────────────────────────────────
// Test 7: reset_returns_initial_state
// ─────────────────────────────────────────────────────────────

#[test]
fn reset_returns_initial_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(dir.path(), "class", 5).unwrap();
    play_rounds(&mut session, 2);

    let result = session.reset().unwrap();
    assert_eq!(result.event_type, "reset");
    assert_eq!(session.state(), &create_initial_state());

    // reset is logged, so it survives a reopen
    drop(session);
    let session = Session::open(dir.path(), "class", 5).unwrap();
    assert_eq!(session.state(), &create_initial_state());
    assert_eq!(session.current_sequence(), 11);
}

// ─────────────────────────────────────────────────────────────
// Test 8: schema_version_rejection
// ─────────────────────────────────────────────────────────────

#[test]
fn schema_version_rejection() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(dir.path(), "class", 0).unwrap();

    let mut bad = EventEnvelope::new(1, GameEvent::Reset);
    bad.schema_version = 99;
    assert!(matches!(
        session.apply_event(&bad),
        Err(SessionError::Engine(EngineError::SchemaVersion { got: 99, .. }))
    ));
    assert!(session.events().unwrap().is_empty());
}

// ─────────────────────────────────────────────────────────────
// Test 9: corrupted_log_detection
// ─────────────────────────────────────────────────────────────

#[test]
fn corrupted_log_detection() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut session = Session::open(dir.path(), "class", 0).unwrap();
        play_rounds(&mut session, 1);
    }

    let log_path = dir.path().join("class").join("events.log");
    let data = fs::read(&log_path).unwrap();
    fs::write(&log_path, &data[..data.len() - 10]).unwrap();

    assert!(matches!(
        Session::open(dir.path(), "class", 0),
        Err(SessionError::Store(_))
    ));
}
