#![forbid(unsafe_code)]

//! Visual Telephone — deterministic game kernel.
//!
//! Five groups, five projects, five rounds. Every group opens its own
//! chain and then answers each neighbour's latest image in a fixed
//! rotation. The kernel decides who may act, accepts turns through a
//! compare-and-append, and checks the result. No I/O lives here.

/// Kernel v1. Bumped only when canonical output changes.
pub const KERNEL_VERSION: u32 = 1;

pub mod catalog;
pub mod domain;
pub mod engine;
pub mod error;
pub mod events;
pub mod hashing;
pub mod invariants;
pub mod resolver;
pub mod rotation;
pub mod state;
pub mod transitions;

pub use domain::{Artifact, GameState, Participant, Project, TransitionResult, Turn, GROUP_ORDER};
pub use engine::TelephoneEngine;
pub use error::EngineError;
pub use events::{EventEnvelope, GameEvent};
pub use resolver::{resolve_task, route, Route, TaskDescriptor};
