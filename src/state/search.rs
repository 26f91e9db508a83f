//! Search engine: substring scan plus cyclic match navigation.
//!
//! `SearchState` is a sum type: either no search is active or there is a
//! non-empty match list with a current position. The empty-match case is
//! unrepresentable in `Active`, so cycling never divides by zero.

/// Direction for match cycling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards later matches, wrapping to the first.
    Forward,
    /// Towards earlier matches, wrapping to the last.
    Backward,
}

/// Search state machine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchState {
    /// No active search.
    #[default]
    Inactive,
    /// Search complete with at least one match.
    Active {
        /// The query, lowercased at activation.
        query: String,
        /// Matching line numbers, ascending, one entry per line.
        matches: Vec<usize>,
        /// Index into `matches` of the current match.
        current: usize,
    },
}

impl SearchState {
    /// Whether a search is currently active.
    pub fn is_active(&self) -> bool {
        matches!(self, SearchState::Active { .. })
    }
}

/// Case-insensitive substring scan over the line buffer.
///
/// Returns matching line numbers in ascending order, one entry per line
/// regardless of how many occurrences the line holds.
pub fn scan(lines: &[String], query: &str) -> Vec<usize> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.to_lowercase().contains(&needle))
        .map(|(number, _)| number)
        .collect()
}

/// Step `current` one position through a match list of length `len`,
/// wrapping with modulo arithmetic. Returns `current` unchanged when the
/// list is empty; callers must check emptiness before presenting a jump.
pub fn cycle(len: usize, current: usize, direction: Direction) -> usize {
    if len == 0 {
        return current;
    }
    match direction {
        Direction::Forward => (current + 1) % len,
        Direction::Backward => (current + len - 1) % len,
    }
}
