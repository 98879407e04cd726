//! Hand-written protobuf types for the event log.
//!
//! Uses prost derive macros for encode/decode without prost-build.
//!
//! ```text
//! message EventEnvelope { uint64 sequence = 1; uint64 logical_time = 2;
//!                         Event event = 3; uint32 schema_version = 4; }
//! message Event { oneof kind { SubmitTurn submit_turn = 1; Reset reset = 2; } }
//! message SubmitTurn { string project_id = 1; uint32 expected_round = 2; Turn turn = 3; }
//! message Turn { string group_id = 1; string prompt = 2; string artifact = 3; int64 timestamp_ms = 4; }
//! message Reset {}
//! ```

use prost::Message;

// ── Event Envelope ─────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct ProtoEventEnvelope {
    #[prost(uint64, tag = "1")]
    pub sequence: u64,
    #[prost(uint64, tag = "2")]
    pub logical_time: u64,
    #[prost(message, optional, tag = "3")]
    pub event: Option<ProtoEvent>,
    #[prost(uint32, tag = "4")]
    pub schema_version: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoEvent {
    #[prost(oneof = "EventKind", tags = "1, 2")]
    pub kind: Option<EventKind>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum EventKind {
    #[prost(message, tag = "1")]
    SubmitTurn(SubmitTurn),
    #[prost(message, tag = "2")]
    Reset(Reset),
}

// ── Payloads ───────────────────────────────────────────────────

#[derive(Clone, PartialEq, Message)]
pub struct SubmitTurn {
    #[prost(string, tag = "1")]
    pub project_id: String,
    #[prost(uint32, tag = "2")]
    pub expected_round: u32,
    #[prost(message, optional, tag = "3")]
    pub turn: Option<ProtoTurn>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoTurn {
    #[prost(string, tag = "1")]
    pub group_id: String,
    #[prost(string, tag = "2")]
    pub prompt: String,
    #[prost(string, tag = "3")]
    pub artifact: String,
    #[prost(int64, tag = "4")]
    pub timestamp_ms: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct Reset {}
