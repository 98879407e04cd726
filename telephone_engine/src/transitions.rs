/// Visual Telephone — Centralized Transition Logic
///
/// ALL state-mutation logic lives here. Inputs are never mutated; every
/// transition returns a fresh `GameState`.

use tracing::debug;

use crate::domain::{GameState, TransitionResult, Turn};
use crate::error::EngineError;
use crate::events::{EventEnvelope, GameEvent};
use crate::resolver::{resolve_task, TaskDescriptor};
use crate::rotation::GROUP_COUNT;
use crate::state;

// ---------------------------------------------------------------------------
// Public dispatcher
// ---------------------------------------------------------------------------

/// Apply *event* to *state* and return `(new_state, result)`.
pub fn apply_event(
    state: &GameState,
    event: &EventEnvelope,
) -> Result<(GameState, TransitionResult), EngineError> {
    match &event.event {
        GameEvent::SubmitTurn {
            project_id,
            expected_round,
            turn,
        } => {
            let new_state = submit_turn(state, project_id, turn.clone(), *expected_round)?;
            let project_completed = new_state
                .project(project_id)
                .is_some_and(|p| p.is_complete);
            let result = TransitionResult {
                event_type: event.event_type().to_string(),
                project_id: Some(project_id.clone()),
                round: Some(*expected_round),
                author: Some(turn.group_id),
                project_completed,
                game_completed: new_state.is_finished(),
            };
            Ok((new_state, result))
        }
        GameEvent::Reset => Ok((
            state::reset(),
            TransitionResult {
                event_type: event.event_type().to_string(),
                ..Default::default()
            },
        )),
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// Compare-and-append one turn.
///
/// Accepted only when the author currently resolves to ACTIVE on
/// `project_id` and that project holds exactly `expected_round - 1` turns.
pub fn submit_turn(
    state: &GameState,
    project_id: &str,
    turn: Turn,
    expected_round: usize,
) -> Result<GameState, EngineError> {
    let index = state
        .project_index(project_id)
        .ok_or_else(|| EngineError::UnknownProject(project_id.to_string()))?;

    if turn.group_id.group_index().is_none() {
        return Err(EngineError::InvalidParticipant(
            turn.group_id.as_str().to_string(),
        ));
    }

    if turn.prompt.trim().is_empty() {
        return Err(EngineError::EmptyPrompt);
    }

    let actual_turns = state.projects[index].turns.len();
    let stale = || EngineError::StaleSubmission {
        project_id: project_id.to_string(),
        expected_round,
        actual_turns,
    };

    if expected_round == 0 || actual_turns != expected_round - 1 {
        return Err(stale());
    }

    match resolve_task(turn.group_id, state)? {
        TaskDescriptor::Active { round, project, .. }
            if project.id == project_id && round == expected_round => {}
        _ => return Err(stale()),
    }

    let mut new_state = state.clone();
    let project = &mut new_state.projects[index];
    project.turns.push(turn);
    project.is_complete = project.turns.len() == GROUP_COUNT;

    debug!(
        project = project_id,
        round = expected_round,
        complete = project.is_complete,
        "turn appended"
    );

    Ok(new_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Artifact, Participant};
    use crate::state::create_initial_state;

    fn turn(group: Participant, prompt: &str) -> Turn {
        Turn {
            group_id: group,
            prompt: prompt.to_string(),
            artifact: Artifact::new(format!("img:{prompt}")),
            timestamp_ms: 1,
        }
    }

    #[test]
    fn submit_appends_without_mutating_input() {
        let s0 = create_initial_state();
        let s1 = submit_turn(&s0, "project-1", turn(Participant::Group1, "castle"), 1).unwrap();
        assert!(s0.projects[0].turns.is_empty());
        assert_eq!(s1.projects[0].turns.len(), 1);
        assert_eq!(s1.projects[0].turns[0].prompt, "castle");
    }

    #[test]
    fn duplicate_round_is_stale() {
        let s0 = create_initial_state();
        let s1 = submit_turn(&s0, "project-1", turn(Participant::Group1, "a"), 1).unwrap();
        let err = submit_turn(&s1, "project-1", turn(Participant::Group1, "b"), 1).unwrap_err();
        assert_eq!(
            err,
            EngineError::StaleSubmission {
                project_id: "project-1".into(),
                expected_round: 1,
                actual_turns: 1,
            }
        );
    }

    #[test]
    fn wrong_author_is_stale() {
        let s0 = create_initial_state();
        // GROUP_2 may not open GROUP_1's chain
        let err = submit_turn(&s0, "project-1", turn(Participant::Group2, "x"), 1).unwrap_err();
        assert!(matches!(err, EngineError::StaleSubmission { .. }));
    }

    #[test]
    fn jumping_ahead_is_stale() {
        let s0 = create_initial_state();
        let err = submit_turn(&s0, "project-1", turn(Participant::Group2, "x"), 2).unwrap_err();
        assert!(matches!(err, EngineError::StaleSubmission { actual_turns: 0, .. }));
    }

    #[test]
    fn rejects_unknown_project_teacher_and_blank_prompt() {
        let s0 = create_initial_state();
        assert_eq!(
            submit_turn(&s0, "project-9", turn(Participant::Group1, "a"), 1).unwrap_err(),
            EngineError::UnknownProject("project-9".into())
        );
        assert!(matches!(
            submit_turn(&s0, "project-1", turn(Participant::Teacher, "a"), 1).unwrap_err(),
            EngineError::InvalidParticipant(_)
        ));
        assert_eq!(
            submit_turn(&s0, "project-1", turn(Participant::Group1, "   "), 1).unwrap_err(),
            EngineError::EmptyPrompt
        );
    }

    #[test]
    fn teacher_is_invalid_whatever_the_round() {
        let s0 = create_initial_state();
        for round in [0, 2, 5] {
            assert_eq!(
                submit_turn(&s0, "project-1", turn(Participant::Teacher, "a"), round).unwrap_err(),
                EngineError::InvalidParticipant("TEACHER".into())
            );
        }
    }

    #[test]
    fn reset_event_clears_turns() {
        let s0 = create_initial_state();
        let s1 = submit_turn(&s0, "project-1", turn(Participant::Group1, "a"), 1).unwrap();
        let (s2, result) = apply_event(&s1, &EventEnvelope::new(2, GameEvent::Reset)).unwrap();
        assert_eq!(s2, create_initial_state());
        assert_eq!(result.event_type, "reset");
    }
}
