//! Snapshot layer — deterministic state snapshots.
//!
//! A snapshot holds the kernel's canonical JSON plus its hash. No
//! timestamps in snapshot content. Restoring decodes the canonical JSON
//! strictly, re-checks the hash and the kernel invariants; if anything
//! disagrees the caller falls back to full replay.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use telephone_engine::hashing::{canonical_hash, canonical_serialize, hex_digest};
use telephone_engine::invariants::validate_invariants;
use telephone_engine::{EngineError, GameState, Project, KERNEL_VERSION};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O: {0}")]
    Io(#[from] io::Error),
    #[error("snapshot serialization: {0}")]
    Serialization(#[source] serde_json::Error),
    #[error("snapshot decode: {0}")]
    Deserialization(#[source] serde_json::Error),
    #[error("snapshot {sequence}: stored hash does not match content")]
    HashMismatch { sequence: u64 },
    #[error("snapshot {sequence}: kernel version {found}, expected {expected}")]
    KernelVersion {
        sequence: u64,
        found: u32,
        expected: u32,
    },
    #[error("snapshot state rejected: {0}")]
    Invariant(#[from] EngineError),
}

/// Snapshot on-disk format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Sequence number at which this snapshot was taken.
    pub sequence: u64,
    /// Canonical JSON of the state (UTF-8).
    pub canonical_json: String,
    /// SHA-256 of the canonical JSON.
    pub hash: String,
    /// Kernel version at snapshot time.
    pub kernel_version: u32,
}

/// Shape of the kernel's canonical document.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CanonicalDocument {
    kernel_version: u32,
    projects: Vec<Project>,
}

fn snapshot_path(dir: &Path, sequence: u64) -> PathBuf {
    dir.join(format!("snapshot_{:06}.json", sequence))
}

/// Build the in-memory snapshot of `state` at `sequence`.
pub fn take_snapshot(sequence: u64, state: &GameState) -> Snapshot {
    let canonical_json = String::from_utf8_lossy(&canonical_serialize(state)).into_owned();
    Snapshot {
        sequence,
        canonical_json,
        hash: canonical_hash(state),
        kernel_version: KERNEL_VERSION,
    }
}

/// Save a deterministic snapshot of the current state.
pub fn save_snapshot(
    dir: &Path,
    sequence: u64,
    state: &GameState,
) -> Result<PathBuf, SnapshotError> {
    fs::create_dir_all(dir)?;

    let snap = take_snapshot(sequence, state);
    let content = serde_json::to_string(&snap).map_err(SnapshotError::Serialization)?;

    let path = snapshot_path(dir, sequence);
    let mut file = File::create(&path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    debug!(path = %path.display(), sequence, "snapshot written");
    Ok(path)
}

/// Load a snapshot at a specific sequence number.
pub fn load_snapshot(dir: &Path, sequence: u64) -> Result<Option<Snapshot>, SnapshotError> {
    let path = snapshot_path(dir, sequence);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let snap = serde_json::from_str(&content).map_err(SnapshotError::Deserialization)?;
    Ok(Some(snap))
}

/// Sequence numbers of every snapshot file in `dir`, ascending.
pub fn list_snapshots(dir: &Path) -> Result<Vec<u64>, SnapshotError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        let parsed = name
            .to_string_lossy()
            .strip_prefix("snapshot_")
            .and_then(|s| s.strip_suffix(".json"))
            .and_then(|s| s.parse::<u64>().ok());
        if let Some(seq) = parsed {
            found.push(seq);
        }
    }
    found.sort_unstable();
    Ok(found)
}

/// Load the snapshot with the highest sequence in a directory.
pub fn load_latest_snapshot(dir: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    match list_snapshots(dir)?.last() {
        Some(seq) => load_snapshot(dir, *seq),
        None => Ok(None),
    }
}

/// True if the stored hash matches the canonical JSON content.
pub fn verify_snapshot_hash(snap: &Snapshot) -> bool {
    hex_digest(snap.canonical_json.as_bytes()) == snap.hash
}

/// Decode a snapshot back into a validated `GameState`.
pub fn restore_snapshot(snap: &Snapshot) -> Result<GameState, SnapshotError> {
    if !verify_snapshot_hash(snap) {
        return Err(SnapshotError::HashMismatch {
            sequence: snap.sequence,
        });
    }

    let doc: CanonicalDocument =
        serde_json::from_str(&snap.canonical_json).map_err(SnapshotError::Deserialization)?;
    if doc.kernel_version != KERNEL_VERSION || snap.kernel_version != KERNEL_VERSION {
        return Err(SnapshotError::KernelVersion {
            sequence: snap.sequence,
            found: doc.kernel_version,
            expected: KERNEL_VERSION,
        });
    }

    let state = GameState {
        projects: doc.projects,
    };
    validate_invariants(&state)?;

    // canonical form must reproduce exactly
    if canonical_hash(&state) != snap.hash {
        return Err(SnapshotError::HashMismatch {
            sequence: snap.sequence,
        });
    }
    Ok(state)
}
