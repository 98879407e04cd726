/// Visual Telephone — Rotation Arithmetic
///
/// The one place that knows how groups, rounds and projects line up.
/// Group `g` initiates project `g`; at round `r` project `p` is worked on
/// by group `(p + r - 1) mod N`, and group `g` works on project
/// `(g - (r - 1)) mod N`. Both directions are derived from this module;
/// the resolver and the dashboard never redo the arithmetic.

/// Number of student groups, projects, and rounds per project.
pub const GROUP_COUNT: usize = 5;

/// Index of the project a group works on in `round` (1-based).
///
/// Result is always normalized into `[0, GROUP_COUNT)`.
pub fn initiator_offset(group_index: usize, round: usize) -> usize {
    debug_assert!(group_index < GROUP_COUNT);
    debug_assert!((1..=GROUP_COUNT).contains(&round));
    let shift = (round - 1) % GROUP_COUNT;
    (group_index + GROUP_COUNT - shift) % GROUP_COUNT
}

/// Index of the group that contributes `round` (1-based) to a project.
pub fn contributor_offset(project_index: usize, round: usize) -> usize {
    debug_assert!(project_index < GROUP_COUNT);
    debug_assert!((1..=GROUP_COUNT).contains(&round));
    (project_index + round - 1) % GROUP_COUNT
}

/// Iterator over every valid round number, `1..=GROUP_COUNT`.
pub fn rounds() -> std::ops::RangeInclusive<usize> {
    1..=GROUP_COUNT
}
