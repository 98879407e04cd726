/// Visual Telephone — Invariant Checks
///
/// Hard validation of a `GameState`. Returns the first failure.
/// Run by the engine after every transition and by snapshot restore.

use crate::domain::{GameState, Participant, Project, GROUP_ORDER};
use crate::error::EngineError;
use crate::rotation::{contributor_offset, initiator_offset, GROUP_COUNT};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run all checks.
pub fn validate_invariants(state: &GameState) -> Result<(), EngineError> {
    check_project_count(state)?;
    for (index, project) in state.projects.iter().enumerate() {
        check_project_identity(index, project)?;
        check_turn_capacity(project)?;
        check_completion_flag(project)?;
        check_turn_authors(index, project)?;
        check_prompts(project)?;
    }
    check_round_order(state)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks (private)
// ---------------------------------------------------------------------------

/// INV-1: exactly one project per group.
fn check_project_count(state: &GameState) -> Result<(), EngineError> {
    if state.projects.len() != GROUP_COUNT {
        return Err(EngineError::invariant(
            "project_count",
            format!("expected {} projects, found {}", GROUP_COUNT, state.projects.len()),
        ));
    }
    Ok(())
}

/// INV-2: project i is `project-{i+1}`, started by `GROUP_ORDER[i]`.
fn check_project_identity(index: usize, project: &Project) -> Result<(), EngineError> {
    let expected_id = Project::id_for_index(index);
    if project.id != expected_id || project.initiator != GROUP_ORDER[index] {
        return Err(EngineError::invariant(
            "project_identity",
            format!(
                "slot {} holds {:?} started by {}, expected {:?} started by {}",
                index,
                project.id,
                project.initiator.as_str(),
                expected_id,
                GROUP_ORDER[index].as_str()
            ),
        ));
    }
    Ok(())
}

/// INV-3: one turn per round at most.
fn check_turn_capacity(project: &Project) -> Result<(), EngineError> {
    if project.turns.len() > GROUP_COUNT {
        return Err(EngineError::invariant(
            "turn_capacity",
            format!("{} has {} turns", project.id, project.turns.len()),
        ));
    }
    Ok(())
}

/// INV-4: complete iff every round is filled.
fn check_completion_flag(project: &Project) -> Result<(), EngineError> {
    let full = project.turns.len() == GROUP_COUNT;
    if project.is_complete != full {
        return Err(EngineError::invariant(
            "completion_flag",
            format!(
                "{} is_complete={} with {} turns",
                project.id,
                project.is_complete,
                project.turns.len()
            ),
        ));
    }
    Ok(())
}

/// INV-5: the turn at round r was written by the rotation's contributor.
fn check_turn_authors(index: usize, project: &Project) -> Result<(), EngineError> {
    for (pos, turn) in project.turns.iter().enumerate() {
        let round = pos + 1;
        let expected = GROUP_ORDER[contributor_offset(index, round)];
        if turn.group_id != expected {
            return Err(EngineError::invariant(
                "turn_author",
                format!(
                    "{} round {} written by {}, expected {}",
                    project.id,
                    round,
                    turn.group_id.as_str(),
                    expected.as_str()
                ),
            ));
        }
    }
    Ok(())
}

/// INV-6: a group only reaches round r after finishing round r-1.
fn check_round_order(state: &GameState) -> Result<(), EngineError> {
    for (index, project) in state.projects.iter().enumerate() {
        for round in 2..=project.turns.len() {
            let author = contributor_offset(index, round);
            let previous = &state.projects[initiator_offset(author, round - 1)];
            if previous.turns.len() < round - 1 {
                return Err(EngineError::invariant(
                    "round_order",
                    format!(
                        "{} wrote round {} of {} before round {} of {}",
                        Participant::from_group_index(author)
                            .map(|p| p.as_str())
                            .unwrap_or("?"),
                        round,
                        project.id,
                        round - 1,
                        previous.id
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// INV-7: every stored prompt has content.
fn check_prompts(project: &Project) -> Result<(), EngineError> {
    if let Some(pos) = project.turns.iter().position(|t| t.prompt.trim().is_empty()) {
        return Err(EngineError::invariant(
            "empty_prompt",
            format!("{} round {} has an empty prompt", project.id, pos + 1),
        ));
    }
    Ok(())
}
