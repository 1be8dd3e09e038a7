//! Keyboard handling.
//!
//! The display has no interactive widgets: `q`/`Q` quits, Ctrl+C (delivered
//! as a key in raw mode rather than as SIGINT) interrupts, and every other
//! key is ignored.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Interrupt,
    Ignore,
}

pub fn classify(key: &KeyEvent) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::Ignore;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c' | 'C') if ctrl => KeyAction::Interrupt,
        KeyCode::Char('q' | 'Q') => KeyAction::Quit,
        _ => KeyAction::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_q_quits_in_either_case() {
        assert_eq!(
            classify(&key(KeyCode::Char('q'), KeyModifiers::NONE)),
            KeyAction::Quit
        );
        assert_eq!(
            classify(&key(KeyCode::Char('Q'), KeyModifiers::SHIFT)),
            KeyAction::Quit
        );
    }

    #[test]
    fn test_ctrl_c_interrupts() {
        assert_eq!(
            classify(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Interrupt
        );
    }

    #[test]
    fn test_other_keys_are_ignored() {
        for code in [KeyCode::Char('c'), KeyCode::Esc, KeyCode::Enter, KeyCode::Char('x')] {
            assert_eq!(classify(&key(code, KeyModifiers::NONE)), KeyAction::Ignore);
        }
    }

    #[test]
    fn test_key_release_is_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(classify(&release), KeyAction::Ignore);
    }
}
