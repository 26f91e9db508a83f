//! Control schemes: named presets mapping input tokens to browsing actions.
//!
//! The three built-in presets mirror the muscle memory of vim, nano and
//! emacs users. A scheme is pure data; turning key events into actions is
//! the job of [`KeyResolver`], which also tracks the pending half of a
//! two-key chord (the emacs quit sequence).

use crate::model::Action;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

/// A single bindable input token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputToken {
    /// A plain printable key, matched case-sensitively.
    Char(char),
    /// A key pressed with Ctrl held.
    Ctrl(char),
    /// A key pressed with Alt held (ESC-prefixed in most terminals).
    Alt(char),
    /// The up arrow.
    Up,
    /// The down arrow.
    Down,
    /// The Page Up key.
    PageUp,
    /// The Page Down key.
    PageDown,
    /// Two Ctrl keys pressed in sequence.
    CtrlChord(char, char),
}

impl InputToken {
    /// Human-readable form for the status bar, in the terminal tradition
    /// (`^X` for Ctrl, `M-v` for Alt).
    pub fn describe(&self) -> String {
        match self {
            InputToken::Char(c) => c.to_string(),
            InputToken::Ctrl(c) => format!("^{}", c.to_ascii_uppercase()),
            InputToken::Alt(c) => format!("M-{c}"),
            InputToken::Up => "\u{2191}".to_string(),
            InputToken::Down => "\u{2193}".to_string(),
            InputToken::PageUp => "PgUp".to_string(),
            InputToken::PageDown => "PgDn".to_string(),
            InputToken::CtrlChord(a, b) => format!(
                "^{} ^{}",
                a.to_ascii_uppercase(),
                b.to_ascii_uppercase()
            ),
        }
    }
}

/// The built-in preset names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPreset {
    /// Single-letter home-row bindings.
    Vim,
    /// Arrow keys plus Ctrl shortcuts.
    Nano,
    /// Ctrl/Meta bindings, including the `C-x C-c` quit chord.
    Emacs,
}

impl ControlPreset {
    /// Parse a preset name, falling back to [`ControlPreset::Vim`] for
    /// unknown names (documented default rather than a hard failure).
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "vim" => ControlPreset::Vim,
            "nano" => ControlPreset::Nano,
            "emacs" => ControlPreset::Emacs,
            other => {
                warn!(preset = other, "unknown control preset, using vim");
                ControlPreset::Vim
            }
        }
    }
}

/// An immutable set of key bindings selected once at session start.
#[derive(Debug, Clone)]
pub struct ControlScheme {
    name: &'static str,
    bindings: Vec<(InputToken, Action)>,
}

impl ControlScheme {
    /// Build the scheme for a preset.
    pub fn preset(preset: ControlPreset) -> Self {
        match preset {
            ControlPreset::Vim => Self::vim(),
            ControlPreset::Nano => Self::nano(),
            ControlPreset::Emacs => Self::emacs(),
        }
    }

    fn vim() -> Self {
        Self {
            name: "vim",
            bindings: vec![
                (InputToken::Char('k'), Action::CursorUp),
                (InputToken::Char('j'), Action::CursorDown),
                (InputToken::Up, Action::CursorUp),
                (InputToken::Down, Action::CursorDown),
                (InputToken::Char('u'), Action::PageUp),
                (InputToken::Char('d'), Action::PageDown),
                (InputToken::PageUp, Action::PageUp),
                (InputToken::PageDown, Action::PageDown),
                (InputToken::Char('f'), Action::FollowLink),
                (InputToken::Char('o'), Action::OpenReference),
                (InputToken::Char('/'), Action::Find),
                (InputToken::Char('t'), Action::SuspendTerminal),
                (InputToken::Char('q'), Action::Quit),
            ],
        }
    }

    fn nano() -> Self {
        Self {
            name: "nano",
            bindings: vec![
                (InputToken::Up, Action::CursorUp),
                (InputToken::Down, Action::CursorDown),
                (InputToken::PageUp, Action::PageUp),
                (InputToken::PageDown, Action::PageDown),
                (InputToken::Ctrl('f'), Action::FollowLink),
                (InputToken::Ctrl('o'), Action::OpenReference),
                (InputToken::Ctrl('w'), Action::Find),
                (InputToken::Ctrl('t'), Action::SuspendTerminal),
                (InputToken::Ctrl('x'), Action::Quit),
            ],
        }
    }

    fn emacs() -> Self {
        Self {
            name: "emacs",
            bindings: vec![
                (InputToken::Ctrl('p'), Action::CursorUp),
                (InputToken::Ctrl('n'), Action::CursorDown),
                (InputToken::Up, Action::CursorUp),
                (InputToken::Down, Action::CursorDown),
                (InputToken::Alt('v'), Action::PageUp),
                (InputToken::Ctrl('v'), Action::PageDown),
                (InputToken::PageUp, Action::PageUp),
                (InputToken::PageDown, Action::PageDown),
                (InputToken::Ctrl('j'), Action::FollowLink),
                (InputToken::Ctrl('o'), Action::OpenReference),
                (InputToken::Ctrl('s'), Action::Find),
                (InputToken::Ctrl('z'), Action::SuspendTerminal),
                (InputToken::CtrlChord('x', 'c'), Action::Quit),
            ],
        }
    }

    /// Preset name, for the status bar and logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// First token bound to `action`, for rendering the control hints.
    pub fn binding_for(&self, action: Action) -> Option<&InputToken> {
        self.bindings
            .iter()
            .find(|(_, a)| *a == action)
            .map(|(token, _)| token)
    }

    /// Whether any chord in the scheme starts with Ctrl+`first`.
    fn has_chord_starting(&self, first: char) -> bool {
        self.bindings
            .iter()
            .any(|(token, _)| matches!(token, InputToken::CtrlChord(a, _) if *a == first))
    }

    /// Action completed by the chord Ctrl+`first` Ctrl+`second`, if bound.
    fn chord_action(&self, first: char, second: char) -> Option<Action> {
        self.bindings.iter().find_map(|(token, action)| match token {
            InputToken::CtrlChord(a, b) if *a == first && *b == second => Some(*action),
            _ => None,
        })
    }

    /// Action bound to a single (non-chord) token.
    fn single_action(&self, token: SimpleToken) -> Option<Action> {
        self.bindings.iter().find_map(|(bound, action)| {
            let hit = match (bound, token) {
                (InputToken::Char(a), SimpleToken::Char(b)) => *a == b,
                (InputToken::Ctrl(a), SimpleToken::Ctrl(b)) => *a == b,
                (InputToken::Alt(a), SimpleToken::Alt(b)) => *a == b,
                (InputToken::Up, SimpleToken::Up)
                | (InputToken::Down, SimpleToken::Down)
                | (InputToken::PageUp, SimpleToken::PageUp)
                | (InputToken::PageDown, SimpleToken::PageDown) => true,
                _ => false,
            };
            if hit { Some(*action) } else { None }
        })
    }
}

/// A key event reduced to the token shapes schemes can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimpleToken {
    Char(char),
    Ctrl(char),
    Alt(char),
    Up,
    Down,
    PageUp,
    PageDown,
}

fn simplify(key: KeyEvent) -> Option<SimpleToken> {
    match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(SimpleToken::Ctrl(c.to_ascii_lowercase()))
        }
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::ALT) => {
            Some(SimpleToken::Alt(c.to_ascii_lowercase()))
        }
        KeyCode::Char(c) => Some(SimpleToken::Char(c)),
        KeyCode::Up => Some(SimpleToken::Up),
        KeyCode::Down => Some(SimpleToken::Down),
        KeyCode::PageUp => Some(SimpleToken::PageUp),
        KeyCode::PageDown => Some(SimpleToken::PageDown),
        _ => None,
    }
}

/// Outcome of resolving one key event against a scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The key completed a binding.
    Act(Action),
    /// The key is the first half of a chord; nothing happens yet.
    Pending,
    /// The key matched nothing in the scheme.
    Unrecognized,
}

/// Stateful resolver: holds the pending first half of a chord.
#[derive(Debug, Default)]
pub struct KeyResolver {
    pending: Option<char>,
}

impl KeyResolver {
    /// Resolve a key event against `scheme`.
    pub fn resolve(&mut self, scheme: &ControlScheme, key: KeyEvent) -> Resolution {
        let token = match simplify(key) {
            Some(t) => t,
            None => {
                self.pending = None;
                return Resolution::Unrecognized;
            }
        };

        if let Some(first) = self.pending.take() {
            if let SimpleToken::Ctrl(second) = token {
                if let Some(action) = scheme.chord_action(first, second) {
                    return Resolution::Act(action);
                }
            }
            // Broken chord falls through to normal resolution.
        }

        if let SimpleToken::Ctrl(c) = token {
            if scheme.has_chord_starting(c) {
                self.pending = Some(c);
                return Resolution::Pending;
            }
        }

        match scheme.single_action(token) {
            Some(action) => Resolution::Act(action),
            None => Resolution::Unrecognized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn unknown_preset_falls_back_to_vim() {
        assert_eq!(ControlPreset::parse("dvorak"), ControlPreset::Vim);
        assert_eq!(ControlPreset::parse("EMACS"), ControlPreset::Emacs);
        assert_eq!(ControlPreset::parse("Nano"), ControlPreset::Nano);
    }

    #[test]
    fn preset_names_are_stable() {
        assert_eq!(ControlScheme::preset(ControlPreset::Vim).name(), "vim");
        assert_eq!(ControlScheme::preset(ControlPreset::Nano).name(), "nano");
        assert_eq!(ControlScheme::preset(ControlPreset::Emacs).name(), "emacs");
    }

    #[test]
    fn vim_scheme_resolves_home_row() {
        let scheme = ControlScheme::preset(ControlPreset::Vim);
        let mut resolver = KeyResolver::default();
        assert_eq!(
            resolver.resolve(&scheme, key('j')),
            Resolution::Act(Action::CursorDown)
        );
        assert_eq!(
            resolver.resolve(&scheme, key('q')),
            Resolution::Act(Action::Quit)
        );
        assert_eq!(resolver.resolve(&scheme, key('z')), Resolution::Unrecognized);
    }

    #[test]
    fn arrows_work_in_every_preset() {
        for preset in [ControlPreset::Vim, ControlPreset::Nano, ControlPreset::Emacs] {
            let scheme = ControlScheme::preset(preset);
            let mut resolver = KeyResolver::default();
            let up = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
            assert_eq!(
                resolver.resolve(&scheme, up),
                Resolution::Act(Action::CursorUp),
                "preset {:?}",
                preset
            );
        }
    }

    #[test]
    fn emacs_quit_chord_requires_both_keys() {
        let scheme = ControlScheme::preset(ControlPreset::Emacs);
        let mut resolver = KeyResolver::default();
        assert_eq!(resolver.resolve(&scheme, ctrl('x')), Resolution::Pending);
        assert_eq!(
            resolver.resolve(&scheme, ctrl('c')),
            Resolution::Act(Action::Quit)
        );
    }

    #[test]
    fn broken_chord_resolves_second_key_normally() {
        let scheme = ControlScheme::preset(ControlPreset::Emacs);
        let mut resolver = KeyResolver::default();
        assert_eq!(resolver.resolve(&scheme, ctrl('x')), Resolution::Pending);
        // C-n is bound on its own; the dangling C-x must not eat it.
        assert_eq!(
            resolver.resolve(&scheme, ctrl('n')),
            Resolution::Act(Action::CursorDown)
        );
    }

    #[test]
    fn bindings_are_case_sensitive() {
        let scheme = ControlScheme::preset(ControlPreset::Vim);
        let mut resolver = KeyResolver::default();
        assert_eq!(
            resolver.resolve(
                &scheme,
                KeyEvent::new(KeyCode::Char('K'), KeyModifiers::SHIFT)
            ),
            Resolution::Unrecognized
        );
    }

    #[test]
    fn describe_formats_control_tokens() {
        assert_eq!(InputToken::Ctrl('x').describe(), "^X");
        assert_eq!(InputToken::CtrlChord('x', 'c').describe(), "^X ^C");
        assert_eq!(InputToken::Alt('v').describe(), "M-v");
        assert_eq!(InputToken::PageUp.describe(), "PgUp");
    }
}
