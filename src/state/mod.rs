//! Browsing state: viewport geometry, link index, search engine and the
//! navigator state machine that composes them.

pub mod links;
pub mod navigator;
pub mod search;
pub mod viewport;

pub use links::{split_marker, LinkEntry, LinkIndex, MarkerParts};
pub use navigator::{ExitReason, Mode, Navigator, Prompt, PromptKind, Vertical};
pub use search::{Direction, SearchState};
pub use viewport::Viewport;
