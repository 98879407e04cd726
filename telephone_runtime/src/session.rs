//! Session manager — one game per directory, persist-after-apply.
//!
//! Directory layout:
//!   <base_dir>/<session_id>/events.log
//!   <base_dir>/<session_id>/snapshots/
//!
//! Apply order:
//!   1. apply the event to a copy of the engine (may be rejected)
//!   2. append it to the event log (only if step 1 succeeded)
//!   3. commit the copy as the live engine
//!   4. snapshot if the interval is reached
//!
//! `SharedSession` serializes all of this behind a `Mutex`, so the
//! compare-and-append in the kernel is atomic per game. Artifact
//! generation runs outside the lock; the submission carries the round the
//! group saw and loses cleanly with `StaleSubmission` if someone got there
//! first.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{info, warn};

use telephone_engine::engine::TelephoneEngine;
use telephone_engine::events::{EventEnvelope, GameEvent};
use telephone_engine::hashing::canonical_hash;
use telephone_engine::{
    resolve_task, Artifact, EngineError, GameState, Participant, TaskDescriptor, TransitionResult,
    Turn,
};

use crate::event_store::{EventStore, StoreError};
use crate::proto_bridge::{kernel_to_proto, proto_to_kernel, BridgeError};
use crate::replay::{self, ReplayError};
use crate::snapshot::{self, SnapshotError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error("{participant} cannot submit now (status {status})")]
    NotActive {
        participant: Participant,
        status: &'static str,
    },
    #[error("session lock poisoned")]
    LockPoisoned,
    #[error("invalid session id {0:?}: must match [a-zA-Z0-9_-]+")]
    InvalidSessionId(String),
}

/// Session ids name a directory under the data dir, so only
/// `[a-zA-Z0-9_-]+` is accepted.
fn check_session_id(session_id: &str) -> Result<(), SessionError> {
    let valid = !session_id.is_empty()
        && session_id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if !valid {
        return Err(SessionError::InvalidSessionId(session_id.to_string()));
    }
    Ok(())
}

/// A finished move, before it is stamped and sequenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnDraft {
    pub author: Participant,
    pub prompt: String,
    pub artifact: Artifact,
}

/// Wall-clock Unix milliseconds for turn timestamps.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// An isolated game with its own event log and snapshots.
#[derive(Debug)]
pub struct Session {
    session_id: String,
    dir: PathBuf,
    engine: TelephoneEngine,
    event_store: EventStore,
    snapshot_interval: u64,
}

impl Session {
    /// Open (or create) the session under `base_dir`, recovering its state
    /// from the newest valid snapshot plus the tail of the log.
    pub fn open(
        base_dir: &Path,
        session_id: &str,
        snapshot_interval: u64,
    ) -> Result<Self, SessionError> {
        check_session_id(session_id)?;
        let dir = base_dir.join(session_id);
        let event_store = EventStore::open(&dir.join("events.log"))?;
        let engine = recover(&dir.join("snapshots"), &event_store)?;

        info!(
            session = session_id,
            sequence = engine.last_sequence(),
            turns = engine.state().total_turns(),
            "session opened"
        );

        Ok(Self {
            session_id: session_id.to_string(),
            dir,
            engine,
            event_store,
            snapshot_interval,
        })
    }

    /// Apply a fully formed envelope: validate via kernel, then persist.
    pub fn apply_event(
        &mut self,
        event: &EventEnvelope,
    ) -> Result<(GameState, TransitionResult), SessionError> {
        let mut next = self.engine.clone();
        let (state, result) = next.apply_event(event)?;
        let state = state.clone();

        self.event_store.append_event(&kernel_to_proto(event))?;
        self.engine = next;

        if self.snapshot_interval > 0 && event.sequence % self.snapshot_interval == 0 {
            if let Err(err) =
                snapshot::save_snapshot(&self.snapshots_dir(), event.sequence, &state)
            {
                // the log is authoritative; a missing snapshot only slows recovery
                warn!(sequence = event.sequence, error = %err, "snapshot failed");
            }
        }

        Ok((state, result))
    }

    /// Sequence and apply an event.
    pub fn append(&mut self, event: GameEvent) -> Result<TransitionResult, SessionError> {
        let envelope = EventEnvelope::new(self.engine.next_sequence(), event);
        self.apply_event(&envelope).map(|(_, result)| result)
    }

    /// Compare-and-append a turn into `project_id` at `expected_round`.
    pub fn submit(
        &mut self,
        project_id: &str,
        expected_round: usize,
        draft: TurnDraft,
    ) -> Result<TransitionResult, SessionError> {
        let author = draft.author;
        let result = self.append(GameEvent::SubmitTurn {
            project_id: project_id.to_string(),
            expected_round,
            turn: Turn {
                group_id: draft.author,
                prompt: draft.prompt,
                artifact: draft.artifact,
                timestamp_ms: now_ms(),
            },
        })?;
        info!(
            session = %self.session_id,
            group = author.as_str(),
            project = project_id,
            round = expected_round,
            "turn submitted"
        );
        Ok(result)
    }

    /// Submit into whatever the author is ACTIVE on right now.
    pub fn submit_current(&mut self, draft: TurnDraft) -> Result<TransitionResult, SessionError> {
        let (project_id, round) = match resolve_task(draft.author, self.engine.state())? {
            TaskDescriptor::Active { round, project, .. } => (project.id.clone(), round),
            other => {
                return Err(SessionError::NotActive {
                    participant: draft.author,
                    status: other.status(),
                })
            }
        };
        self.submit(&project_id, round, draft)
    }

    /// Discard every turn of this game.
    pub fn reset(&mut self) -> Result<TransitionResult, SessionError> {
        let result = self.append(GameEvent::Reset)?;
        info!(session = %self.session_id, "game reset");
        Ok(result)
    }

    /// Full replay from the event log; the live engine is rebuilt to match.
    pub fn replay_full(&mut self) -> Result<(GameState, String), SessionError> {
        let events = load_kernel_events(&self.event_store)?;
        let (state, hash) = replay::rebuild_state(&events)?;

        let mut engine = TelephoneEngine::new();
        engine.apply_sequence(&events)?;
        self.engine = engine;

        Ok((state, hash))
    }

    /// Every event in the log, in kernel form.
    pub fn events(&self) -> Result<Vec<EventEnvelope>, SessionError> {
        load_kernel_events(&self.event_store)
    }

    pub fn state(&self) -> &GameState {
        self.engine.state()
    }

    pub fn current_hash(&self) -> String {
        canonical_hash(self.engine.state())
    }

    pub fn current_sequence(&self) -> u64 {
        self.engine.last_sequence()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn snapshots_dir(&self) -> PathBuf {
        self.dir.join("snapshots")
    }
}

fn load_kernel_events(store: &EventStore) -> Result<Vec<EventEnvelope>, SessionError> {
    store
        .load_all_events()?
        .iter()
        .map(|p| proto_to_kernel(p).map_err(SessionError::from))
        .collect()
}

/// Newest usable snapshot + log tail, else full replay.
fn recover(snap_dir: &Path, store: &EventStore) -> Result<TelephoneEngine, SessionError> {
    let last = store.last_sequence();

    for seq in snapshot::list_snapshots(snap_dir)?.into_iter().rev() {
        if seq > last {
            warn!(sequence = seq, last, "snapshot ahead of event log, ignored");
            continue;
        }
        let restored = snapshot::load_snapshot(snap_dir, seq)
            .and_then(|snap| snap.map(|s| snapshot::restore_snapshot(&s)).transpose());
        let state = match restored {
            Ok(Some(state)) => state,
            Ok(None) => continue,
            Err(err) => {
                warn!(sequence = seq, error = %err, "snapshot unusable, trying older");
                continue;
            }
        };

        let mut engine = TelephoneEngine::from_state(state, seq)?;
        for proto in store.load_events_after(seq)? {
            engine.apply_event(&proto_to_kernel(&proto)?)?;
        }
        return Ok(engine);
    }

    let mut engine = TelephoneEngine::new();
    engine.apply_sequence(&load_kernel_events(store)?)?;
    Ok(engine)
}

/// Thread-safe session handle: one writer at a time per game.
#[derive(Debug)]
pub struct SharedSession {
    inner: Mutex<Session>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Session>, SessionError> {
        self.inner.lock().map_err(|_| SessionError::LockPoisoned)
    }

    pub fn submit(
        &self,
        project_id: &str,
        expected_round: usize,
        draft: TurnDraft,
    ) -> Result<TransitionResult, SessionError> {
        self.lock()?.submit(project_id, expected_round, draft)
    }

    pub fn reset(&self) -> Result<TransitionResult, SessionError> {
        self.lock()?.reset()
    }

    /// Run `f` against the current state under the lock.
    pub fn with_state<R>(&self, f: impl FnOnce(&GameState) -> R) -> Result<R, SessionError> {
        Ok(f(self.lock()?.state()))
    }

    pub fn current_hash(&self) -> Result<String, SessionError> {
        Ok(self.lock()?.current_hash())
    }

    pub fn current_sequence(&self) -> Result<u64, SessionError> {
        Ok(self.lock()?.current_sequence())
    }

    pub fn into_inner(self) -> Result<Session, SessionError> {
        self.inner.into_inner().map_err(|_| SessionError::LockPoisoned)
    }
}
