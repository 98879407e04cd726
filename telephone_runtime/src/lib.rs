#![forbid(unsafe_code)]

//! Visual Telephone — Runtime
//!
//! Wraps the kernel with persistence, replay, snapshots, session
//! management, the teacher dashboard, and the classroom extras
//! (artifact generation seam, passcode gate, student picker).
//!
//! No game rules live here — turn assignment, submission and validation
//! are delegated to `telephone_engine`.

pub mod access;
pub mod config;
pub mod dashboard;
pub mod event_store;
pub mod generator;
pub mod picker;
pub mod proto_bridge;
pub mod proto_types;
pub mod replay;
pub mod session;
pub mod snapshot;
