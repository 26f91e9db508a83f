//! The content-navigation state machine.
//!
//! The navigator owns every piece of live browsing state: scroll offset,
//! cursor row, the loaded content buffer and its link index, search state,
//! the prompt line and the exit reason. The session loop feeds it one key
//! event at a time through [`Navigator::dispatch`]; everything else here is
//! the operations that call composes.
//!
//! Geometry invariants, upheld after every mutation:
//! - `scroll + cursor` indexes a real content line
//! - `scroll <= max(0, lines.len() - content_rows)`
//!
//! All clamps saturate; nothing here can wrap or panic on geometry.

use crate::config::{ControlScheme, KeyResolver, Resolution};
use crate::model::{Action, PLACEHOLDER_LINE};
use crate::state::links::LinkIndex;
use crate::state::search::{self, Direction, SearchState};
use crate::state::viewport::Viewport;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

/// Rows of lookahead kept between the cursor and the viewport edge before
/// the view scrolls instead of the cursor moving.
const SOFT_MARGIN: usize = 2;

/// The hidden developer shortcut: typing these letters on otherwise unbound
/// keys ends the session and hands the terminal to the card game.
const EGG_SEQUENCE: &str = "DURAK";

/// Why the dispatch loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitReason {
    /// Still browsing.
    #[default]
    None,
    /// A new reference was requested (prompt submit or followed link).
    NewReference,
    /// The user asked to quit.
    Quit,
    /// The hidden activation sequence fired.
    EasterEgg,
}

/// Vertical movement direction for cursor and page operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertical {
    /// Towards the top of the buffer.
    Up,
    /// Towards the bottom of the buffer.
    Down,
}

/// What the prompt line is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// A reference (URL) to load.
    Reference,
    /// A search query.
    Search,
}

/// Line-editing state for the reference and search prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// What the input will be used for.
    pub kind: PromptKind,
    /// The text entered so far.
    pub buffer: String,
    /// Caret position, in characters.
    pub cursor: usize,
}

impl Prompt {
    fn new(kind: PromptKind, prefill: &str) -> Self {
        Self {
            kind,
            buffer: prefill.to_string(),
            cursor: prefill.chars().count(),
        }
    }

    fn byte_cursor(&self) -> usize {
        self.buffer
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.buffer.len())
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_cursor();
        self.buffer.insert(at, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_cursor();
            self.buffer.remove(at);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.buffer.chars().count() {
            let at = self.byte_cursor();
            self.buffer.remove(at);
        }
    }
}

/// Whether the navigator is browsing or collecting prompt input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// Normal key dispatch against the control scheme.
    #[default]
    Browsing,
    /// The prompt line owns the keyboard.
    Prompt(Prompt),
}

/// The core state machine. One instance per process, owned by the session
/// loop and passed explicitly to every operation.
#[derive(Debug)]
pub struct Navigator {
    lines: Vec<String>,
    links: LinkIndex,
    viewport: Viewport,
    scheme: ControlScheme,
    resolver: KeyResolver,
    scroll: usize,
    cursor: usize,
    current_reference: String,
    search: SearchState,
    mode: Mode,
    exit: ExitReason,
    notice: Option<String>,
    suspend_requested: bool,
    egg_buffer: String,
}

impl Navigator {
    /// Create a navigator with an empty placeholder buffer.
    pub fn new(scheme: ControlScheme, viewport: Viewport) -> Self {
        Self {
            lines: vec![PLACEHOLDER_LINE.to_string()],
            links: LinkIndex::default(),
            viewport,
            scheme,
            resolver: KeyResolver::default(),
            scroll: 0,
            cursor: 0,
            current_reference: String::new(),
            search: SearchState::Inactive,
            mode: Mode::Browsing,
            exit: ExitReason::None,
            notice: None,
            suspend_requested: false,
            egg_buffer: String::new(),
        }
    }

    // ===== Accessors for the view layer =====

    /// The loaded content buffer. Never empty.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Current scroll offset (index of the top visible line).
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Cursor row within the content region.
    pub fn cursor_row(&self) -> usize {
        self.cursor
    }

    /// Absolute line number under the cursor.
    pub fn cursor_line(&self) -> usize {
        self.scroll + self.cursor
    }

    /// The reference currently loaded (or requested).
    pub fn current_reference(&self) -> &str {
        &self.current_reference
    }

    /// The link index built for the current buffer.
    pub fn links(&self) -> &LinkIndex {
        &self.links
    }

    /// Current search state.
    pub fn search(&self) -> &SearchState {
        &self.search
    }

    /// Browsing or prompt mode.
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Transient status notice, cleared by the next dispatched key.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Current viewport geometry.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The active control scheme.
    pub fn scheme(&self) -> &ControlScheme {
        &self.scheme
    }

    /// Why the last dispatch returned `false`.
    pub fn exit_reason(&self) -> ExitReason {
        self.exit
    }

    /// Consume a pending suspend-terminal request, if one was dispatched.
    pub fn take_suspend_request(&mut self) -> bool {
        std::mem::take(&mut self.suspend_requested)
    }

    // ===== Lifecycle =====

    /// Replace the content buffer and link index for a freshly loaded
    /// reference. Resets scroll, cursor, search and any pending exit.
    pub fn load(&mut self, lines: Vec<String>, links: LinkIndex, reference: impl Into<String>) {
        self.lines = if lines.is_empty() {
            vec![PLACEHOLDER_LINE.to_string()]
        } else {
            lines
        };
        self.links = links;
        self.current_reference = reference.into();
        self.scroll = 0;
        self.cursor = 0;
        self.search = SearchState::Inactive;
        self.mode = Mode::Browsing;
        self.exit = ExitReason::None;
        self.notice = None;
        self.egg_buffer.clear();
        debug!(
            lines = self.lines.len(),
            links = self.links.len(),
            reference = %self.current_reference,
            "content loaded"
        );
    }

    /// Apply a new viewport after a terminal resize, re-clamping geometry.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.clamp();
    }

    /// Post a transient status notice.
    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    /// Enter the reference prompt, prefilled with the current reference.
    pub fn open_reference_prompt(&mut self) {
        let prefill = self.current_reference.clone();
        self.mode = Mode::Prompt(Prompt::new(PromptKind::Reference, &prefill));
    }

    /// Enter the search prompt with an empty buffer.
    pub fn open_search_prompt(&mut self) {
        self.mode = Mode::Prompt(Prompt::new(PromptKind::Search, ""));
    }

    // ===== Dispatch =====

    /// The single entry point consumed by the session loop.
    ///
    /// Resolves the key against the active control scheme (plus the
    /// reserved literals `n`/`N` for match cycling and Esc for clearing an
    /// active search), mutates state accordingly, and returns `false`
    /// exactly when an exit reason has been set. Every branch implies a
    /// redraw on return.
    pub fn dispatch(&mut self, key: KeyEvent) -> bool {
        self.notice = None;
        match self.mode {
            Mode::Prompt(_) => self.dispatch_prompt(key),
            Mode::Browsing => self.dispatch_browsing(key),
        }
        matches!(self.exit, ExitReason::None)
    }

    fn dispatch_prompt(&mut self, key: KeyEvent) {
        let Mode::Prompt(mut prompt) = std::mem::take(&mut self.mode) else {
            return;
        };
        match key.code {
            KeyCode::Enter => {
                let input = prompt.buffer.trim().to_string();
                match prompt.kind {
                    PromptKind::Reference => {
                        if !input.is_empty() {
                            self.current_reference = input;
                            self.exit = ExitReason::NewReference;
                        }
                    }
                    PromptKind::Search => {
                        if !input.is_empty() {
                            self.begin_search(&input);
                        }
                    }
                }
            }
            KeyCode::Esc => {}
            KeyCode::Left => {
                prompt.cursor = prompt.cursor.saturating_sub(1);
                self.mode = Mode::Prompt(prompt);
            }
            KeyCode::Right => {
                prompt.cursor = (prompt.cursor + 1).min(prompt.buffer.chars().count());
                self.mode = Mode::Prompt(prompt);
            }
            KeyCode::Home => {
                prompt.cursor = 0;
                self.mode = Mode::Prompt(prompt);
            }
            KeyCode::End => {
                prompt.cursor = prompt.buffer.chars().count();
                self.mode = Mode::Prompt(prompt);
            }
            KeyCode::Backspace => {
                prompt.backspace();
                self.mode = Mode::Prompt(prompt);
            }
            KeyCode::Delete => {
                prompt.delete();
                self.mode = Mode::Prompt(prompt);
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                prompt.insert(c);
                self.mode = Mode::Prompt(prompt);
            }
            _ => {
                self.mode = Mode::Prompt(prompt);
            }
        }
    }

    fn dispatch_browsing(&mut self, key: KeyEvent) {
        match self.resolver.resolve(&self.scheme, key) {
            Resolution::Act(action) => self.perform(action),
            Resolution::Pending => {}
            Resolution::Unrecognized => self.handle_unbound(key),
        }
    }

    fn perform(&mut self, action: Action) {
        // Any bound key breaks the hidden activation sequence.
        self.egg_buffer.clear();
        match action {
            // While a search is active the scheme's up/down double as
            // previous/next match (documented overload).
            Action::CursorUp if self.search.is_active() => self.find_previous(),
            Action::CursorDown if self.search.is_active() => self.find_next(),
            Action::CursorUp => self.move_cursor(Vertical::Up),
            Action::CursorDown => self.move_cursor(Vertical::Down),
            Action::PageUp => self.page_scroll(Vertical::Up),
            Action::PageDown => self.page_scroll(Vertical::Down),
            Action::FollowLink => self.follow_link(),
            Action::OpenReference => self.open_reference_prompt(),
            Action::Find => self.open_search_prompt(),
            Action::SuspendTerminal => self.suspend_requested = true,
            Action::Quit => self.exit = ExitReason::Quit,
        }
    }

    fn handle_unbound(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) || key.modifiers.contains(KeyModifiers::ALT)
        {
            return;
        }
        match key.code {
            KeyCode::Char('n') => self.find_next(),
            KeyCode::Char('N') => self.find_previous(),
            KeyCode::Esc => {
                if self.search.is_active() {
                    self.clear_search();
                }
                self.egg_buffer.clear();
            }
            KeyCode::Char(c) => {
                self.egg_buffer.push(c);
                let len = self.egg_buffer.chars().count();
                if len > EGG_SEQUENCE.len() {
                    let cut = self
                        .egg_buffer
                        .char_indices()
                        .nth(len - EGG_SEQUENCE.len())
                        .map(|(i, _)| i)
                        .unwrap_or(0);
                    self.egg_buffer.drain(..cut);
                }
                if self.egg_buffer == EGG_SEQUENCE {
                    info!("hidden activation sequence entered");
                    self.exit = ExitReason::EasterEgg;
                }
            }
            _ => {}
        }
    }

    // ===== Cursor and scroll =====

    fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport.content_rows)
    }

    fn clamp(&mut self) {
        self.scroll = self.scroll.min(self.max_scroll());
        let visible = (self.lines.len() - self.scroll).min(self.viewport.content_rows);
        self.cursor = self.cursor.min(visible.saturating_sub(1));
    }

    /// Move the cursor one row, shifting the scroll offset instead once the
    /// soft margin at the viewport edge is crossed.
    pub fn move_cursor(&mut self, direction: Vertical) {
        let rows = self.viewport.content_rows;
        match direction {
            Vertical::Up => {
                self.cursor = self.cursor.saturating_sub(1);
                if self.cursor < SOFT_MARGIN {
                    self.scroll = self.scroll.saturating_sub(1);
                }
            }
            Vertical::Down => {
                let last_row = (rows - 1).min(
                    self.lines
                        .len()
                        .saturating_sub(self.scroll)
                        .saturating_sub(1),
                );
                self.cursor = (self.cursor + 1).min(last_row);
                if self.cursor + SOFT_MARGIN + 1 > rows {
                    self.scroll = (self.scroll + 1).min(self.max_scroll());
                }
            }
        }
    }

    /// Shift the scroll offset by one full content page and park the cursor
    /// on the top row.
    pub fn page_scroll(&mut self, direction: Vertical) {
        let rows = self.viewport.content_rows;
        self.scroll = match direction {
            Vertical::Up => self.scroll.saturating_sub(rows),
            Vertical::Down => (self.scroll + rows).min(self.max_scroll()),
        };
        self.cursor = 0;
    }

    /// Recenter so `line` is visible and put the cursor on it.
    fn jump_to_line(&mut self, line: usize) {
        let rows = self.viewport.content_rows;
        if line < self.scroll || line >= self.scroll + rows {
            self.scroll = line.min(self.max_scroll());
        }
        self.cursor = line - self.scroll;
    }

    // ===== Links =====

    /// Follow the link on the cursor line. On a hit the target becomes the
    /// current reference and the dispatch loop exits with
    /// [`ExitReason::NewReference`]; on a miss only a transient notice is
    /// posted.
    pub fn follow_link(&mut self) {
        match self.links.get(self.cursor_line()) {
            Some(entry) => {
                info!(target = %entry.target, "following link");
                self.current_reference = entry.target.clone();
                self.exit = ExitReason::NewReference;
            }
            None => self.notice = Some("No link at cursor position".to_string()),
        }
    }

    // ===== Search =====

    /// Run a search and jump to the first match, if any. An absent query
    /// posts a notice and leaves scroll, cursor and search state untouched.
    pub fn begin_search(&mut self, query: &str) {
        let lowered = query.to_lowercase();
        let matches = search::scan(&self.lines, &lowered);
        if matches.is_empty() {
            self.notice = Some(format!("No matches found for '{query}'"));
            return;
        }
        let first = matches[0];
        let total = matches.len();
        self.search = SearchState::Active {
            query: lowered,
            matches,
            current: 0,
        };
        self.jump_to_line(first);
        self.notice = Some(format!("Match 1 of {total}"));
    }

    /// Jump to the next match, wrapping past the end. No-op when no search
    /// is active.
    pub fn find_next(&mut self) {
        self.cycle_match(Direction::Forward);
    }

    /// Jump to the previous match, wrapping past the start. No-op when no
    /// search is active.
    pub fn find_previous(&mut self) {
        self.cycle_match(Direction::Backward);
    }

    fn cycle_match(&mut self, direction: Direction) {
        let (line, position, total) = match &mut self.search {
            SearchState::Active {
                matches, current, ..
            } => {
                *current = search::cycle(matches.len(), *current, direction);
                (matches[*current], *current + 1, matches.len())
            }
            SearchState::Inactive => return,
        };
        self.jump_to_line(line);
        self.notice = Some(format!("Match {position} of {total}"));
    }

    /// Drop the active search without touching scroll or cursor.
    pub fn clear_search(&mut self) {
        self.search = SearchState::Inactive;
    }
}

#[cfg(test)]
#[path = "navigator_tests.rs"]
mod tests;
