use crate::session::result::ResultSummary;
use crate::session::state::{AdvanceOutcome, TypingSession};

/// Judgment of a single passage character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CharState {
    #[default]
    Untyped,
    Correct,
    /// Holds the character that was actually typed.
    Incorrect(char),
}

impl CharState {
    pub fn is_judged(self) -> bool {
        !matches!(self, CharState::Untyped)
    }
}

/// A keystroke as the session understands it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keystroke {
    Char(char),
    Space,
    Backspace,
}

impl Keystroke {
    pub fn from_char(ch: char) -> Self {
        if ch == ' ' {
            Keystroke::Space
        } else {
            Keystroke::Char(ch)
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum KeyOutcome {
    /// The keystroke did not change the session.
    Ignored,
    Accepted,
    /// The keystroke exhausted the passage.
    Completed(ResultSummary),
}

impl KeyOutcome {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, KeyOutcome::Ignored)
    }
}

pub fn process_keystroke(session: &mut TypingSession, key: Keystroke) -> KeyOutcome {
    match key {
        Keystroke::Char(ch) => {
            if session.type_character(ch) {
                KeyOutcome::Accepted
            } else {
                KeyOutcome::Ignored
            }
        }
        Keystroke::Space => match session.advance_word() {
            AdvanceOutcome::Rejected => KeyOutcome::Ignored,
            AdvanceOutcome::Advanced => KeyOutcome::Accepted,
            AdvanceOutcome::Completed(summary) => KeyOutcome::Completed(summary),
        },
        Keystroke::Backspace => {
            if session.backspace() {
                KeyOutcome::Accepted
            } else {
                KeyOutcome::Ignored
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn active(text: &str) -> TypingSession {
        let mut session = TypingSession::new(60);
        session.load_passage(text);
        session.start();
        session
    }

    #[test]
    fn test_space_maps_to_word_advance() {
        assert_eq!(Keystroke::from_char(' '), Keystroke::Space);
        assert_eq!(Keystroke::from_char('a'), Keystroke::Char('a'));
    }

    #[test]
    fn test_space_ignored_while_word_incomplete() {
        let mut session = active("cat dog");
        process_keystroke(&mut session, Keystroke::Char('c'));
        assert_eq!(process_keystroke(&mut session, Keystroke::Space), KeyOutcome::Ignored);
        assert_eq!(session.active_word(), 0);
    }

    #[test]
    fn test_typing_whole_passage_completes() {
        let mut session = active("hi yo");
        for ch in "hi yo".chars() {
            let outcome = process_keystroke(&mut session, Keystroke::from_char(ch));
            assert!(outcome.is_accepted());
        }
        assert_matches!(
            process_keystroke(&mut session, Keystroke::Space),
            KeyOutcome::Completed(_)
        );
    }

    #[test]
    fn test_keystrokes_ignored_before_start() {
        let mut session = TypingSession::new(60);
        session.load_passage("cat");
        assert_eq!(process_keystroke(&mut session, Keystroke::Char('c')), KeyOutcome::Ignored);
        assert_eq!(process_keystroke(&mut session, Keystroke::Backspace), KeyOutcome::Ignored);
        assert_eq!(session.total_keystrokes(), 0);
    }

    #[test]
    fn test_char_state_judged() {
        assert!(!CharState::Untyped.is_judged());
        assert!(CharState::Correct.is_judged());
        assert!(CharState::Incorrect('x').is_judged());
    }
}
