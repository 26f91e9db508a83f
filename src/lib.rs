//! sweb - a small text-mode web browser
//!
//! Fetches a page over HTTP, renders it to plain display lines with inline
//! link markers, and drives a three-region terminal UI (reference bar,
//! content, status bar) with remappable control schemes, soft-margin
//! scrolling and incremental search.
//!
//! The state machine in [`state::Navigator`] is pure with respect to the
//! terminal: it consumes key events and exposes geometry, which keeps the
//! whole browsing model testable without a TTY. IO lives at the edges, in
//! [`fetch`] and [`view`].

pub mod config;
pub mod fetch;
pub mod game;
pub mod logging;
pub mod model;
pub mod state;
pub mod transform;
pub mod view;
