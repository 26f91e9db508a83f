//! Property-based tests for the navigator's geometry and search invariants.
//!
//! The properties under test:
//! - After any sequence of movement keys, `scroll + cursor` indexes a real
//!   content line and `scroll` never exceeds its maximum.
//! - The invariants survive resizes interleaved with movement.
//! - Cycling through N matches always stays in `[0, N)` and N forward
//!   steps return to the starting match.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use proptest::prelude::*;
use sweb::config::{ControlPreset, ControlScheme};
use sweb::state::{LinkIndex, Navigator, SearchState, Viewport};

// ===== Arbitrary Strategies =====

#[derive(Debug, Clone, Copy)]
enum Move {
    Up,
    Down,
    PageUp,
    PageDown,
}

fn arb_move() -> impl Strategy<Value = Move> {
    prop_oneof![
        Just(Move::Up),
        Just(Move::Down),
        Just(Move::PageUp),
        Just(Move::PageDown),
    ]
}

fn arb_moves() -> impl Strategy<Value = Vec<Move>> {
    prop::collection::vec(arb_move(), 0..60)
}

/// Content buffers from one line up to several screenfuls. Every fifth
/// line carries the search needle so queries always have matches.
fn arb_lines() -> impl Strategy<Value = Vec<String>> {
    (1usize..120).prop_map(|count| {
        (0..count)
            .map(|i| {
                if i % 5 == 0 {
                    format!("line {i} with needle")
                } else {
                    format!("line {i}")
                }
            })
            .collect()
    })
}

fn arb_viewport() -> impl Strategy<Value = Viewport> {
    (3u16..40, 20u16..120).prop_map(|(rows, cols)| Viewport::new(rows, cols))
}

fn navigator_with(lines: Vec<String>, viewport: Viewport) -> Navigator {
    let links = LinkIndex::build(&lines);
    let mut navigator = Navigator::new(ControlScheme::preset(ControlPreset::Vim), viewport);
    navigator.load(lines, links, "http://example.test/");
    navigator
}

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn apply(navigator: &mut Navigator, step: Move) {
    let c = match step {
        Move::Up => 'k',
        Move::Down => 'j',
        Move::PageUp => 'u',
        Move::PageDown => 'd',
    };
    navigator.dispatch(key(c));
}

fn assert_geometry(navigator: &Navigator) {
    let len = navigator.lines().len();
    let rows = navigator.viewport().content_rows;
    let max_scroll = len.saturating_sub(rows);
    assert!(
        navigator.scroll() <= max_scroll,
        "scroll {} exceeds max {max_scroll} (len {len}, rows {rows})",
        navigator.scroll()
    );
    assert!(
        navigator.cursor_line() < len,
        "cursor line {} outside buffer of {len}",
        navigator.cursor_line()
    );
    assert!(
        navigator.cursor_row() < rows,
        "cursor row {} outside content region of {rows}",
        navigator.cursor_row()
    );
}

// ===== Properties =====

proptest! {
    #[test]
    fn movement_preserves_geometry(
        lines in arb_lines(),
        viewport in arb_viewport(),
        moves in arb_moves(),
    ) {
        let mut navigator = navigator_with(lines, viewport);
        for step in moves {
            apply(&mut navigator, step);
            assert_geometry(&navigator);
        }
    }

    #[test]
    fn resize_between_moves_preserves_geometry(
        lines in arb_lines(),
        viewport in arb_viewport(),
        moves in arb_moves(),
        resized in arb_viewport(),
        resize_at in 0usize..60,
    ) {
        let mut navigator = navigator_with(lines, viewport);
        for (index, step) in moves.into_iter().enumerate() {
            if index == resize_at {
                navigator.resize(resized);
                assert_geometry(&navigator);
            }
            apply(&mut navigator, step);
            assert_geometry(&navigator);
        }
    }

    #[test]
    fn match_cycling_stays_in_bounds_and_wraps(
        lines in arb_lines(),
        viewport in arb_viewport(),
        forward_steps in 0usize..30,
    ) {
        let mut navigator = navigator_with(lines, viewport);
        navigator.begin_search("needle");

        let total = match navigator.search() {
            SearchState::Active { matches, .. } => matches.len(),
            SearchState::Inactive => panic!("needle is present on every fifth line"),
        };
        prop_assert!(total >= 1);

        for _ in 0..forward_steps {
            navigator.find_next();
            match navigator.search() {
                SearchState::Active { matches, current, .. } => {
                    prop_assert!(*current < matches.len());
                    prop_assert!(matches[*current] < navigator.lines().len());
                }
                SearchState::Inactive => prop_assert!(false, "search dropped while cycling"),
            }
            assert_geometry(&navigator);
        }
    }

    #[test]
    fn full_forward_cycle_returns_to_the_start(
        lines in arb_lines(),
        viewport in arb_viewport(),
    ) {
        let mut navigator = navigator_with(lines, viewport);
        navigator.begin_search("needle");

        let (start, total) = match navigator.search() {
            SearchState::Active { matches, current, .. } => (*current, matches.len()),
            SearchState::Inactive => panic!("needle is present on every fifth line"),
        };

        for _ in 0..total {
            navigator.find_next();
        }
        match navigator.search() {
            SearchState::Active { current, .. } => prop_assert_eq!(*current, start),
            SearchState::Inactive => prop_assert!(false, "search dropped while cycling"),
        }
    }
}
