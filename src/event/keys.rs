//! Key bindings of the input line.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press asks the frontend to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Insert(char),
    Backspace,
    Submit,
    ClearOutput,
    ScrollUp,
    ScrollDown,
    /// Jump back to the newest output.
    FollowTail,
    Quit,
}

/// Translate a key event. Releases and unbound keys map to `None`.
pub fn map_key(key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c' | 'C') if ctrl => Some(Action::Quit),
        KeyCode::Char('l' | 'L') if ctrl => Some(Action::ClearOutput),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(Action::Insert(c)),
        KeyCode::Enter => Some(Action::Submit),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::PageUp => Some(Action::ScrollUp),
        KeyCode::PageDown => Some(Action::ScrollDown),
        KeyCode::End => Some(Action::FollowTail),
        KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}
