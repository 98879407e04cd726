/// Visual Telephone — Canonical Hashing
///
/// Deterministic canonical serialization + SHA-256 hashing.
///
/// Rules:
///   - Projects in group order, turns in round order
///   - Fixed field order at every level
///   - UTF-8 JSON, no whitespace, no float

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::{GameState, Project, Turn};
use crate::KERNEL_VERSION;

/// Canonical serialization of GameState to UTF-8 JSON bytes.
/// Includes kernel_version as the first field for identity binding.
pub fn canonical_serialize(state: &GameState) -> Vec<u8> {
    // Value -> String cannot fail: every key is a string.
    build_canonical_value(state).to_string().into_bytes()
}

/// SHA-256 of canonical serialization. Lowercase hex string.
pub fn canonical_hash(state: &GameState) -> String {
    hex_digest(&canonical_serialize(state))
}

/// Lowercase hex SHA-256 of arbitrary bytes.
pub fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Field order: kernel_version, projects
fn build_canonical_value(state: &GameState) -> Value {
    let projects = state.projects.iter().map(project_value).collect();

    let mut root = Map::new();
    root.insert(
        "kernel_version".to_string(),
        Value::Number(KERNEL_VERSION.into()),
    );
    root.insert("projects".to_string(), Value::Array(projects));
    Value::Object(root)
}

/// Field order: id, initiator, is_complete, turns
fn project_value(project: &Project) -> Value {
    let mut map = Map::new();
    map.insert("id".to_string(), Value::String(project.id.clone()));
    map.insert(
        "initiator".to_string(),
        Value::String(project.initiator.as_str().to_string()),
    );
    map.insert("is_complete".to_string(), Value::Bool(project.is_complete));
    map.insert(
        "turns".to_string(),
        Value::Array(project.turns.iter().map(turn_value).collect()),
    );
    Value::Object(map)
}

/// Field order: group_id, prompt, artifact, timestamp_ms
fn turn_value(turn: &Turn) -> Value {
    let mut map = Map::new();
    map.insert(
        "group_id".to_string(),
        Value::String(turn.group_id.as_str().to_string()),
    );
    map.insert("prompt".to_string(), Value::String(turn.prompt.clone()));
    map.insert(
        "artifact".to_string(),
        Value::String(turn.artifact.as_str().to_string()),
    );
    map.insert(
        "timestamp_ms".to_string(),
        Value::Number(turn.timestamp_ms.into()),
    );
    Value::Object(map)
}
