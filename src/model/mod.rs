//! Core domain types shared across the crate.

pub mod action;

pub use action::Action;

/// The single line shown when a transform produces no content at all.
/// The content buffer invariant (`len >= 1`) is kept by substituting it.
pub const PLACEHOLDER_LINE: &str = "No content available.";
