//! Terminal surface and the session loop.
//!
//! Three fixed regions: the reference bar on row 0, the content region in
//! between, and the status bar on the last row. The terminal is acquired
//! once (raw mode plus alternate screen) behind an RAII guard so that every
//! exit path, including panics, releases it exactly once. The one scoped
//! exception is the suspend-terminal action, which releases the display,
//! blocks on a single acknowledgement line and then unconditionally
//! reacquires it.

use crate::fetch::{describe_status, FetchOutcome, Fetcher};
use crate::model::Action;
use crate::state::{
    split_marker, ExitReason, LinkIndex, Mode, Navigator, PromptKind, SearchState, Viewport,
};
use crate::transform;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use std::io::{self, Stdout};
use thiserror::Error;
use tracing::{info, warn};
use unicode_width::UnicodeWidthStr;

/// Errors that can occur during terminal operations.
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error from the terminal layer.
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),
}

/// How the browsing session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user quit.
    Quit,
    /// The hidden activation sequence fired; the caller owns what happens
    /// next on the restored line-mode terminal.
    EasterEgg,
}

/// RAII ownership of the display resource. Acquiring enables raw mode and
/// enters the alternate screen; dropping reverses both. Release must
/// happen on every path that acquired, so it lives in `Drop`.
struct TerminalGuard;

impl TerminalGuard {
    fn acquire() -> io::Result<Self> {
        enable_raw_mode()?;
        io::stdout().execute(EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
    }
}

/// The session loop: owns the terminal, the navigator and the fetch
/// collaborator for the process lifetime.
pub struct TuiApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    navigator: Navigator,
    fetcher: Fetcher,
    _guard: TerminalGuard,
}

impl TuiApp {
    /// Acquire the terminal and build the session. Failure here is the one
    /// fatal condition: no navigator state exists yet, so nothing needs
    /// cleanup beyond the guard.
    pub fn new(
        scheme: crate::config::ControlScheme,
        fetcher: Fetcher,
    ) -> Result<Self, TuiError> {
        let guard = TerminalGuard::acquire()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        terminal.clear()?;
        let size = terminal.size()?;
        let navigator = Navigator::new(scheme, Viewport::new(size.height, size.width));
        Ok(Self {
            terminal,
            navigator,
            fetcher,
            _guard: guard,
        })
    }

    /// Drive the session: prompt, fetch, transform, load, dispatch, until
    /// the user quits or the easter egg fires. Consumes the app so the
    /// terminal is restored before the caller regains control.
    pub fn run(mut self, initial_reference: Option<String>) -> Result<SessionEnd, TuiError> {
        let mut reference = initial_reference;
        let mut pending_notice: Option<String> = None;

        loop {
            let target = match reference.take() {
                Some(target) => target,
                None => {
                    self.show_welcome(pending_notice.take());
                    match self.dispatch_until_exit()? {
                        ExitReason::NewReference => {
                            self.navigator.current_reference().to_string()
                        }
                        ExitReason::Quit | ExitReason::None => return Ok(SessionEnd::Quit),
                        ExitReason::EasterEgg => return Ok(SessionEnd::EasterEgg),
                    }
                }
            };

            let text = match self.fetch_with_retry(&target)? {
                Fetched::Text(text) => text,
                Fetched::Abandoned(notice) => {
                    // Abandon always clears the pending reference so the
                    // user is re-prompted.
                    pending_notice = notice;
                    continue;
                }
            };

            let width = usize::from(self.navigator.viewport().cols);
            let (lines, count) = transform::to_display_lines(&text, &target, width);
            let links = LinkIndex::build(&lines);
            info!(reference = %target, lines = count, links = links.len(), "page loaded");
            self.navigator.load(lines, links, target);

            match self.dispatch_until_exit()? {
                ExitReason::NewReference => {
                    reference = Some(self.navigator.current_reference().to_string());
                }
                ExitReason::Quit | ExitReason::None => return Ok(SessionEnd::Quit),
                ExitReason::EasterEgg => return Ok(SessionEnd::EasterEgg),
            }
        }
    }

    fn show_welcome(&mut self, notice: Option<String>) {
        let open_key = self
            .navigator
            .scheme()
            .binding_for(Action::OpenReference)
            .map(|token| token.describe())
            .unwrap_or_else(|| "o".to_string());
        let quit_key = self
            .navigator
            .scheme()
            .binding_for(Action::Quit)
            .map(|token| token.describe())
            .unwrap_or_else(|| "q".to_string());
        let lines = vec![
            String::new(),
            "  Welcome to sweb.".to_string(),
            String::new(),
            format!("  Press {open_key} to open a reference."),
            format!("  Press {quit_key} to quit."),
        ];
        self.navigator.load(lines, LinkIndex::default(), "");
        self.navigator.open_reference_prompt();
        if let Some(notice) = notice {
            self.navigator.set_notice(notice);
        }
    }

    /// Block on key events until the navigator sets an exit reason.
    fn dispatch_until_exit(&mut self) -> Result<ExitReason, TuiError> {
        loop {
            self.draw()?;
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    let keep_going = self.navigator.dispatch(key);
                    if self.navigator.take_suspend_request() {
                        self.suspend()?;
                    }
                    if !keep_going {
                        return Ok(self.navigator.exit_reason());
                    }
                }
                Event::Resize(cols, rows) => {
                    self.navigator.resize(Viewport::new(rows, cols));
                }
                _ => {}
            }
        }
    }

    /// Fetch with an explicit retry loop (never recursion): soft errors and
    /// trust failures become blocking retry/abandon decisions, hard
    /// failures abandon with a notice. Verification starts enabled on
    /// every call, so a trust override never outlives this reference.
    fn fetch_with_retry(&mut self, reference: &str) -> Result<Fetched, TuiError> {
        let mut verify = true;
        loop {
            self.draw_message(reference, &format!("Loading {reference} ..."))?;
            let outcome = self.fetcher.fetch(reference, verify);
            if let FetchOutcome::HardFailure(message) = &outcome {
                warn!(%message, "fetch failed");
            }
            match classify_outcome(outcome, verify) {
                FetchStep::Loaded(text) => return Ok(Fetched::Text(text)),
                FetchStep::AskRetry { screen } => {
                    if self.confirm(reference, &screen, "Retry? (y/N) ")? {
                        continue;
                    }
                    return Ok(Fetched::Abandoned(None));
                }
                FetchStep::AskOverride { screen } => {
                    if self.confirm(reference, &screen, "Load unsafe site? (y/N) ")? {
                        verify = false;
                        continue;
                    }
                    return Ok(Fetched::Abandoned(None));
                }
                FetchStep::Abandon(notice) => return Ok(Fetched::Abandoned(notice)),
            }
        }
    }

    /// Blocking yes/no decision screen. Defaults to "no" on Enter or Esc.
    fn confirm(
        &mut self,
        reference: &str,
        body: &[String],
        question: &str,
    ) -> Result<bool, TuiError> {
        loop {
            self.draw_screen(reference, body, question)?;
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => return Ok(true),
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Enter | KeyCode::Esc => {
                        return Ok(false);
                    }
                    _ => {}
                },
                Event::Resize(cols, rows) => {
                    self.navigator.resize(Viewport::new(rows, cols));
                }
                _ => {}
            }
        }
    }

    fn draw(&mut self) -> Result<(), TuiError> {
        let navigator = &self.navigator;
        self.terminal.draw(|frame| render(frame, navigator))?;
        Ok(())
    }

    fn draw_message(&mut self, reference: &str, message: &str) -> Result<(), TuiError> {
        self.draw_screen(reference, &[], message)
    }

    fn draw_screen(
        &mut self,
        reference: &str,
        body: &[String],
        bar_text: &str,
    ) -> Result<(), TuiError> {
        self.terminal.draw(|frame| {
            let chunks = Layout::vertical([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(frame.area());

            frame.render_widget(
                Paragraph::new(bar_text.to_string()).style(address_bar_style()),
                chunks[0],
            );
            let lines: Vec<Line> = body.iter().map(|l| Line::raw(l.clone())).collect();
            frame.render_widget(Paragraph::new(lines), chunks[1]);
            frame.render_widget(
                Paragraph::new(reference.to_string()).style(status_bar_style()),
                chunks[2],
            );
        })?;
        Ok(())
    }

    /// Release the display, wait for one acknowledgement line, then
    /// reacquire and reinitialize. The reacquire runs even when the wait
    /// fails; this cycle must never leak the terminal.
    fn suspend(&mut self) -> Result<(), TuiError> {
        info!("suspending terminal");
        disable_raw_mode()?;
        io::stdout().execute(LeaveAlternateScreen)?;

        let waited = wait_for_ack();
        let restored = self.reacquire();
        waited?;
        restored
    }

    fn reacquire(&mut self) -> Result<(), TuiError> {
        enable_raw_mode()?;
        io::stdout().execute(EnterAlternateScreen)?;
        self.terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        self.terminal.clear()?;
        let size = self.terminal.size()?;
        self.navigator.resize(Viewport::new(size.height, size.width));
        info!("terminal reacquired");
        Ok(())
    }
}

enum Fetched {
    Text(String),
    Abandoned(Option<String>),
}

/// The session's next step for one fetch outcome, given the current
/// verification state. Pure, so the retry/abandon semantics are testable
/// apart from the blocking event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FetchStep {
    /// Body ready for the transform stage.
    Loaded(String),
    /// Blocking decision: retry the same fetch on yes, abandon on no.
    AskRetry {
        /// Diagnostic screen shown alongside the question.
        screen: Vec<String>,
    },
    /// Blocking decision: retry with certificate verification disabled on
    /// yes, abandon on no.
    AskOverride {
        /// Warning screen shown alongside the question.
        screen: Vec<String>,
    },
    /// Give up on this reference, optionally posting a notice.
    Abandon(Option<String>),
}

fn classify_outcome(outcome: FetchOutcome, verify: bool) -> FetchStep {
    match outcome {
        FetchOutcome::Success(text) => FetchStep::Loaded(text),
        FetchOutcome::SoftError {
            status,
            reason,
            body,
        } => FetchStep::AskRetry {
            screen: http_error_screen(status, &reason, &body),
        },
        FetchOutcome::TrustFailure if verify => FetchStep::AskOverride {
            screen: trust_warning_screen(),
        },
        // Verification was already off; the override did not help.
        FetchOutcome::TrustFailure => FetchStep::Abandon(Some(
            "Certificate error persists. Cannot load page.".to_string(),
        )),
        FetchOutcome::HardFailure(_) => FetchStep::Abandon(Some(
            "Failed to fetch page. Please try again.".to_string(),
        )),
    }
}

fn wait_for_ack() -> Result<(), TuiError> {
    println!();
    println!("Press Enter to return to the browser...");
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(())
}

// ===== Rendering =====

fn address_bar_style() -> Style {
    Style::new().fg(Color::White).bg(Color::Blue)
}

fn status_bar_style() -> Style {
    Style::new().fg(Color::Black).bg(Color::White)
}

fn highlight_style() -> Style {
    Style::new().fg(Color::Black).bg(Color::Yellow)
}

/// Render the three fixed regions from navigator state. Public so render
/// tests can drive it through a `TestBackend`.
pub fn render(frame: &mut Frame, navigator: &Navigator) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .split(frame.area());

    render_reference_bar(frame, chunks[0], navigator);
    render_content(frame, chunks[1], navigator);
    render_status_bar(frame, chunks[2], navigator);
}

fn render_reference_bar(frame: &mut Frame, area: Rect, navigator: &Navigator) {
    let text = match navigator.mode() {
        Mode::Prompt(prompt) => {
            let label = match prompt.kind {
                PromptKind::Reference => "URL: ",
                PromptKind::Search => "Search: ",
            };
            let shown: String = prompt.buffer.chars().take(prompt.cursor).collect();
            let x = area.x + (label.width() + shown.width()) as u16;
            frame.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
            format!("{label}{}", prompt.buffer)
        }
        Mode::Browsing => match navigator.notice() {
            Some(notice) => notice.to_string(),
            None if navigator.current_reference().is_empty() => "sweb".to_string(),
            None => navigator.current_reference().to_string(),
        },
    };
    frame.render_widget(Paragraph::new(text).style(address_bar_style()), area);
}

fn render_content(frame: &mut Frame, area: Rect, navigator: &Navigator) {
    let scroll = navigator.scroll();
    let rows = usize::from(area.height);
    let query = match navigator.search() {
        SearchState::Active { query, .. } => Some(query.as_str()),
        SearchState::Inactive => None,
    };

    let mut lines: Vec<Line> = Vec::with_capacity(rows);
    for (row, raw) in navigator.lines().iter().skip(scroll).take(rows).enumerate() {
        let is_cursor = row == navigator.cursor_row();
        lines.push(content_line(raw, is_cursor, query));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

/// Build one display line: link text underlined, the cursor row reversed,
/// search occurrences highlighted on non-link lines.
fn content_line<'a>(raw: &'a str, is_cursor: bool, query: Option<&str>) -> Line<'a> {
    let base = if is_cursor {
        Style::new().add_modifier(Modifier::REVERSED)
    } else {
        Style::new()
    };

    if let Some(parts) = split_marker(raw) {
        let link_style = base.add_modifier(Modifier::UNDERLINED);
        return Line::from(vec![
            Span::styled(parts.before, base),
            Span::styled(parts.text, link_style),
            Span::styled(parts.after, base),
        ]);
    }

    match query {
        Some(query) if !is_cursor => highlighted_line(raw, query, base),
        _ => Line::styled(raw, base),
    }
}

/// Split a line into plain and highlighted spans around each
/// case-insensitive occurrence of `query`.
fn highlighted_line<'a>(raw: &'a str, query: &str, base: Style) -> Line<'a> {
    let lowered = raw.to_lowercase();
    let needle = query.to_lowercase();
    if needle.is_empty() || !lowered.contains(&needle) {
        return Line::styled(raw, base);
    }

    // Byte offsets can drift between the original and its lowercase form
    // for multi-byte case pairs; fall back to an unhighlighted line then.
    if lowered.len() != raw.len() {
        return Line::styled(raw, base);
    }

    let mut spans = Vec::new();
    let mut at = 0;
    while let Some(rel) = lowered[at..].find(&needle) {
        let start = at + rel;
        let end = start + needle.len();
        if start > at {
            spans.push(Span::styled(&raw[at..start], base));
        }
        spans.push(Span::styled(&raw[start..end], highlight_style()));
        at = end;
    }
    if at < raw.len() {
        spans.push(Span::styled(&raw[at..], base));
    }
    Line::from(spans)
}

fn render_status_bar(frame: &mut Frame, area: Rect, navigator: &Navigator) {
    let scheme = navigator.scheme();
    let hint = |action: Action, label: &str| {
        scheme
            .binding_for(action)
            .map(|token| format!("{label}: {}", token.describe()))
    };

    // The match position leads so width-truncation eats hints, never it.
    let mut parts: Vec<String> = Vec::new();
    if let SearchState::Active {
        matches, current, ..
    } = navigator.search()
    {
        parts.push(format!("MATCH: {}/{}", current + 1, matches.len()));
    }
    parts.extend(
        [
            hint(Action::CursorUp, "UP"),
            hint(Action::CursorDown, "DOWN"),
            hint(Action::Quit, "QUIT"),
            hint(Action::FollowLink, "FOLLOW"),
            hint(Action::SuspendTerminal, "TERM"),
            hint(Action::Find, "FIND"),
            hint(Action::OpenReference, "OPEN"),
        ]
        .into_iter()
        .flatten(),
    );

    let mut text = parts.join("  ");
    let max = usize::from(area.width).saturating_sub(1);
    if text.width() > max {
        text.truncate(
            text.char_indices()
                .scan(0usize, |acc, (i, c)| {
                    *acc += c.to_string().width();
                    if *acc > max { None } else { Some(i + c.len_utf8()) }
                })
                .last()
                .unwrap_or(0),
        );
    }
    frame.render_widget(Paragraph::new(text).style(status_bar_style()), area);
}

/// Diagnostic screen for an HTTP error status: status line, a short
/// description, then the first lines of the server's response body.
fn http_error_screen(status: u16, reason: &str, body: &str) -> Vec<String> {
    let mut screen = vec![
        format!("HTTP Error {status} - {reason}"),
        String::new(),
        describe_status(status).to_string(),
        String::new(),
        "Server Response:".to_string(),
        "-".repeat(40),
    ];
    let shown: Vec<&str> = body.lines().take(5).collect();
    let truncated = body.lines().count() > shown.len();
    screen.extend(shown.iter().map(|line| format!("  {line}")));
    if truncated {
        screen.push("  ...".to_string());
    }
    screen.push(String::new());
    screen.push("Do you want to retry?".to_string());
    screen
}

/// Warning screen for a certificate validation failure.
fn trust_warning_screen() -> Vec<String> {
    [
        "SSL Certificate Error",
        "",
        "The website's security certificate is not trusted.",
        "This could mean:",
        "  - The certificate has expired",
        "  - The certificate is self-signed",
        "  - The connection is being intercepted",
        "",
        "Loading this site may expose your data to attackers.",
        "",
        "Do you want to proceed anyway?",
    ]
    .iter()
    .map(|line| line.to_string())
    .collect()
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
