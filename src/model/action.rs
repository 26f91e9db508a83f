//! Domain-level browsing actions independent of key bindings.

/// Logical actions that can be mapped to configurable key bindings.
///
/// These represent user intent, not specific keys. The mapping from
/// `crossterm::event::KeyEvent` to `Action` is handled by the active
/// [`ControlScheme`](crate::config::ControlScheme).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Move the cursor up one line (scrolls once the soft margin is hit).
    CursorUp,
    /// Move the cursor down one line (scrolls once the soft margin is hit).
    CursorDown,
    /// Scroll up by one full content page.
    PageUp,
    /// Scroll down by one full content page.
    PageDown,
    /// Follow the link on the cursor line, if any.
    FollowLink,
    /// Open the reference prompt to load a new page.
    OpenReference,
    /// Open the search prompt.
    Find,
    /// Temporarily yield the display back to the line-mode terminal.
    SuspendTerminal,
    /// Exit the browsing session.
    Quit,
}
