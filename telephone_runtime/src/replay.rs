//! Replay orchestrator — rebuild state from an event stream.
//!
//! Delegates all game logic to the kernel. No cached state.

use thiserror::Error;

use telephone_engine::engine::TelephoneEngine;
use telephone_engine::events::EventEnvelope;
use telephone_engine::hashing::canonical_hash;
use telephone_engine::{EngineError, GameState};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("replay rejected event: {0}")]
    Rejected(#[from] EngineError),
    #[error("determinism failure: run 1 = {first}, run 2 = {second}")]
    Nondeterministic { first: String, second: String },
}

/// Rebuild the game from a sequence of events.
///
/// Returns `(final_state, canonical_hash)`.
pub fn rebuild_state(events: &[EventEnvelope]) -> Result<(GameState, String), ReplayError> {
    let mut engine = TelephoneEngine::new();
    let state = engine.apply_sequence(events)?.clone();
    let hash = canonical_hash(&state);
    Ok((state, hash))
}

/// Rebuild state and return only the canonical hash.
pub fn rebuild_hash(events: &[EventEnvelope]) -> Result<String, ReplayError> {
    rebuild_state(events).map(|(_, hash)| hash)
}

/// Replay the same events twice and require identical hashes.
pub fn verify_determinism(events: &[EventEnvelope]) -> Result<String, ReplayError> {
    let first = rebuild_hash(events)?;
    let second = rebuild_hash(events)?;
    if first != second {
        return Err(ReplayError::Nondeterministic { first, second });
    }
    Ok(first)
}
