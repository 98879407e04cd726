/// Visual Telephone — Core Domain Types
///
/// Pure data. No behaviour beyond lookups and formatting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::rotation::GROUP_COUNT;

// ── Participants ───────────────────────────────────────────────────

/// A student group or the teacher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Participant {
    Teacher,
    #[serde(rename = "GROUP_1")]
    Group1,
    #[serde(rename = "GROUP_2")]
    Group2,
    #[serde(rename = "GROUP_3")]
    Group3,
    #[serde(rename = "GROUP_4")]
    Group4,
    #[serde(rename = "GROUP_5")]
    Group5,
}

/// Fixed group order. Index in this array == group index == project index.
pub const GROUP_ORDER: [Participant; GROUP_COUNT] = [
    Participant::Group1,
    Participant::Group2,
    Participant::Group3,
    Participant::Group4,
    Participant::Group5,
];

impl Participant {
    /// Position in `GROUP_ORDER`, `None` for the teacher.
    pub fn group_index(self) -> Option<usize> {
        GROUP_ORDER.iter().position(|g| *g == self)
    }

    pub fn from_group_index(index: usize) -> Option<Self> {
        GROUP_ORDER.get(index).copied()
    }

    pub fn is_teacher(self) -> bool {
        self == Participant::Teacher
    }

    /// Wire identifier, e.g. `GROUP_3`.
    pub fn as_str(self) -> &'static str {
        match self {
            Participant::Teacher => "TEACHER",
            Participant::Group1 => "GROUP_1",
            Participant::Group2 => "GROUP_2",
            Participant::Group3 => "GROUP_3",
            Participant::Group4 => "GROUP_4",
            Participant::Group5 => "GROUP_5",
        }
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.group_index() {
            Some(i) => write!(f, "Group {}", i + 1),
            None => write!(f, "Teacher"),
        }
    }
}

/// Accepts `GROUP_3`, `group_3`, `group3`, `3` and `teacher`.
impl FromStr for Participant {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        if norm == "TEACHER" {
            return Ok(Participant::Teacher);
        }
        let digits = norm
            .strip_prefix("GROUP_")
            .or_else(|| norm.strip_prefix("GROUP"))
            .unwrap_or(&norm);
        digits
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(Participant::from_group_index)
            .ok_or_else(|| EngineError::InvalidParticipant(s.to_string()))
    }
}

// ── Turns and projects ─────────────────────────────────────────────

/// Opaque reference to a generated artifact (data URI, digest, URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Artifact(pub String);

impl Artifact {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One completed move. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Turn {
    pub group_id: Participant,
    pub prompt: String,
    pub artifact: Artifact,
    /// Unix milliseconds, supplied by whoever created the turn.
    pub timestamp_ms: i64,
}

/// One visual chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    pub id: String,
    pub initiator: Participant,
    pub turns: Vec<Turn>,
    pub is_complete: bool,
}

impl Project {
    /// `project-1` .. `project-5`.
    pub fn id_for_index(index: usize) -> String {
        format!("project-{}", index + 1)
    }

    /// Number of completed rounds.
    pub fn rounds_done(&self) -> usize {
        self.turns.len()
    }

    pub fn first_turn(&self) -> Option<&Turn> {
        self.turns.first()
    }

    pub fn latest_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }
}

/// Complete game snapshot: exactly `GROUP_COUNT` projects in group order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameState {
    pub projects: Vec<Project>,
}

impl GameState {
    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    pub fn project_index(&self, project_id: &str) -> Option<usize> {
        self.projects.iter().position(|p| p.id == project_id)
    }

    pub fn total_turns(&self) -> usize {
        self.projects.iter().map(|p| p.turns.len()).sum()
    }

    pub fn is_finished(&self) -> bool {
        self.projects.iter().all(|p| p.is_complete)
    }
}

impl Default for GameState {
    fn default() -> Self {
        crate::state::create_initial_state()
    }
}

/// Structured outcome of a state transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionResult {
    pub event_type: String,
    pub project_id: Option<String>,
    pub round: Option<usize>,
    pub author: Option<Participant>,
    pub project_completed: bool,
    pub game_completed: bool,
}
