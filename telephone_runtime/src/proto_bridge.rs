//! Proto ↔ Kernel conversion bridge.
//!
//! Kernel → proto is total. Proto → kernel rejects frames that decode
//! but do not describe a valid kernel event.

use telephone_engine::events::{EventEnvelope, GameEvent};
use telephone_engine::{Artifact, EngineError, Participant, Turn};
use thiserror::Error;

use crate::proto_types::*;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("event {sequence}: envelope has no event")]
    MissingEvent { sequence: u64 },
    #[error("event {sequence}: submit_turn has no turn")]
    MissingTurn { sequence: u64 },
    #[error("event {sequence}: {source}")]
    Participant {
        sequence: u64,
        #[source]
        source: EngineError,
    },
}

/// Convert a kernel envelope to its protobuf form.
pub fn kernel_to_proto(event: &EventEnvelope) -> ProtoEventEnvelope {
    let kind = match &event.event {
        GameEvent::SubmitTurn {
            project_id,
            expected_round,
            turn,
        } => EventKind::SubmitTurn(SubmitTurn {
            project_id: project_id.clone(),
            expected_round: u32::try_from(*expected_round).unwrap_or(u32::MAX),
            turn: Some(ProtoTurn {
                group_id: turn.group_id.as_str().to_string(),
                prompt: turn.prompt.clone(),
                artifact: turn.artifact.as_str().to_string(),
                timestamp_ms: turn.timestamp_ms,
            }),
        }),
        GameEvent::Reset => EventKind::Reset(Reset {}),
    };

    ProtoEventEnvelope {
        sequence: event.sequence,
        logical_time: event.logical_time,
        event: Some(ProtoEvent { kind: Some(kind) }),
        schema_version: event.schema_version,
    }
}

/// Convert a protobuf envelope back to the kernel's envelope.
pub fn proto_to_kernel(proto: &ProtoEventEnvelope) -> Result<EventEnvelope, BridgeError> {
    let sequence = proto.sequence;
    let kind = proto
        .event
        .as_ref()
        .and_then(|e| e.kind.as_ref())
        .ok_or(BridgeError::MissingEvent { sequence })?;

    let event = match kind {
        EventKind::SubmitTurn(st) => {
            let pt = st.turn.as_ref().ok_or(BridgeError::MissingTurn { sequence })?;
            let group_id: Participant = pt
                .group_id
                .parse()
                .map_err(|source| BridgeError::Participant { sequence, source })?;
            GameEvent::SubmitTurn {
                project_id: st.project_id.clone(),
                expected_round: st.expected_round as usize,
                turn: Turn {
                    group_id,
                    prompt: pt.prompt.clone(),
                    artifact: Artifact::new(pt.artifact.clone()),
                    timestamp_ms: pt.timestamp_ms,
                },
            }
        }
        EventKind::Reset(_) => GameEvent::Reset,
    };

    Ok(EventEnvelope {
        sequence,
        logical_time: proto.logical_time,
        schema_version: proto.schema_version,
        event,
    })
}
