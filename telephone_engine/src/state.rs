/// Visual Telephone — State Construction

use crate::domain::{GameState, Project, GROUP_ORDER};

/// Create a fresh game: one empty project per group, in group order.
pub fn create_initial_state() -> GameState {
    GameState {
        projects: GROUP_ORDER
            .iter()
            .enumerate()
            .map(|(index, group)| Project {
                id: Project::id_for_index(index),
                initiator: *group,
                turns: Vec::new(),
                is_complete: false,
            })
            .collect(),
    }
}

/// Discard every turn. Same ids, same initiators, same order.
pub fn reset() -> GameState {
    create_initial_state()
}
