//! Teacher dashboard — read-only views over a game.
//!
//! Which group produced step i of a chain comes from the kernel's
//! rotation module, the same formula the resolver uses.

use serde::Serialize;

use telephone_engine::rotation::{contributor_offset, rounds, GROUP_COUNT};
use telephone_engine::{GameState, Participant, Project, Turn};

/// Whole-class progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassProgress {
    pub total_turns: usize,
    pub max_turns: usize,
    /// Rounded to the nearest whole percent.
    pub percent: usize,
    pub projects: Vec<ProjectSummary>,
}

/// One card on the dashboard: where the chain started and where it is now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub id: String,
    pub initiator: Participant,
    pub turns: usize,
    pub is_complete: bool,
    pub first: Option<Turn>,
    pub latest: Option<Turn>,
}

/// One slot of the expanded chain view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainStep {
    pub round: usize,
    pub group: Participant,
    pub turn: Option<Turn>,
}

pub fn class_progress(state: &GameState) -> ClassProgress {
    let total_turns = state.total_turns();
    let max_turns = GROUP_COUNT * GROUP_COUNT;
    ClassProgress {
        total_turns,
        max_turns,
        percent: (total_turns * 100 + max_turns / 2) / max_turns,
        projects: state.projects.iter().map(summarize).collect(),
    }
}

fn summarize(project: &Project) -> ProjectSummary {
    ProjectSummary {
        id: project.id.clone(),
        initiator: project.initiator,
        turns: project.turns.len(),
        is_complete: project.is_complete,
        first: project.first_turn().cloned(),
        latest: project.latest_turn().cloned(),
    }
}

/// All rounds of one project, filled or not. `None` for an unknown id.
pub fn chain_detail(state: &GameState, project_id: &str) -> Option<Vec<ChainStep>> {
    let index = state.project_index(project_id)?;
    let project = &state.projects[index];
    rounds()
        .map(|round| {
            Some(ChainStep {
                round,
                group: Participant::from_group_index(contributor_offset(index, round))?,
                turn: project.turns.get(round - 1).cloned(),
            })
        })
        .collect()
}
