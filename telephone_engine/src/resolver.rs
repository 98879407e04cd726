/// Visual Telephone — Turn-Assignment Resolver
///
/// Pure derivation of "what should this group be doing right now".
/// Reads only the passed-in state. Never mutates.

use serde::Serialize;

use crate::catalog::initiator_theme;
use crate::domain::{GameState, Participant, Project, Turn};
use crate::error::EngineError;
use crate::rotation::{contributor_offset, initiator_offset, rounds};

/// A group's current task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskDescriptor<'a> {
    /// The group may act now. `reference` is the turn it must respond to
    /// (absent in round 1).
    Active {
        round: usize,
        project: &'a Project,
        reference: Option<&'a Turn>,
    },
    /// The previous link in the chain has not been submitted yet.
    Waiting { round: usize, project: &'a Project },
    /// Every round is done for this group.
    Complete,
}

impl<'a> TaskDescriptor<'a> {
    pub fn round(&self) -> Option<usize> {
        match self {
            TaskDescriptor::Active { round, .. } | TaskDescriptor::Waiting { round, .. } => {
                Some(*round)
            }
            TaskDescriptor::Complete => None,
        }
    }

    pub fn project(&self) -> Option<&'a Project> {
        match self {
            TaskDescriptor::Active { project, .. } | TaskDescriptor::Waiting { project, .. } => {
                Some(project)
            }
            TaskDescriptor::Complete => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TaskDescriptor::Active { .. })
    }

    pub fn status(&self) -> &'static str {
        match self {
            TaskDescriptor::Active { .. } => "ACTIVE",
            TaskDescriptor::Waiting { .. } => "WAITING",
            TaskDescriptor::Complete => "COMPLETE",
        }
    }

    /// Starting theme, only for a group opening its own chain.
    pub fn theme(&self) -> Option<&'static str> {
        match self {
            TaskDescriptor::Active {
                round: 1, project, ..
            } => initiator_theme(project.initiator),
            _ => None,
        }
    }

    /// For `Waiting`: the previous round on the project and the group that
    /// owes it.
    pub fn blocked_by(&self) -> Option<(usize, Participant)> {
        match self {
            TaskDescriptor::Waiting { round, project } => {
                let previous = round.checked_sub(1).filter(|r| *r >= 1)?;
                let project_index = project.initiator.group_index()?;
                let group =
                    Participant::from_group_index(contributor_offset(project_index, previous))?;
                Some((previous, group))
            }
            _ => None,
        }
    }
}

/// Where a participant lands after choosing a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "task", rename_all = "snake_case")]
pub enum Route<'a> {
    Dashboard,
    Task(TaskDescriptor<'a>),
}

/// Resolve the current task of a student group.
///
/// The teacher is not a valid input; use [`route`] to send it to the dashboard.
pub fn resolve_task<'a>(
    participant: Participant,
    state: &'a GameState,
) -> Result<TaskDescriptor<'a>, EngineError> {
    let group_index = participant
        .group_index()
        .ok_or_else(|| EngineError::InvalidParticipant(participant.as_str().to_string()))?;

    for round in rounds() {
        let offset = initiator_offset(group_index, round);
        let project = state.projects.get(offset).ok_or_else(|| {
            EngineError::invariant(
                "project_count",
                format!("no project at offset {offset}"),
            )
        })?;

        let done = project.turns.len();
        if done >= round {
            continue;
        }

        // round 1 compares against 0, so it is never blocked
        if done < round - 1 {
            return Ok(TaskDescriptor::Waiting { round, project });
        }

        let reference = if round > 1 {
            project.turns.get(round - 2)
        } else {
            None
        };
        return Ok(TaskDescriptor::Active {
            round,
            project,
            reference,
        });
    }

    Ok(TaskDescriptor::Complete)
}

/// Role selection: teacher goes to the dashboard, groups get their task.
pub fn route<'a>(participant: Participant, state: &'a GameState) -> Result<Route<'a>, EngineError> {
    if participant.is_teacher() {
        return Ok(Route::Dashboard);
    }
    resolve_task(participant, state).map(Route::Task)
}
