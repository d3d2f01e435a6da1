use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::session::clock::{Clock, SystemClock};
use crate::session::input::CharState;
use crate::session::passage::Passage;
use crate::session::result::ResultSummary;

pub const DEFAULT_TIME_LIMIT_SECS: u32 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Idle,
    Active,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordState {
    Pending,
    Current,
    Correct,
    Incorrect,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    Ignored,
    Counted { remaining: u32 },
    Expired(ResultSummary),
}

#[derive(Clone, Debug, PartialEq)]
pub enum AdvanceOutcome {
    Rejected,
    Advanced,
    Completed(ResultSummary),
}

/// One timed attempt at a passage.
///
/// The `char_state` grid is the single source of truth for what has been
/// typed; rendering and the typed-word strings are derived from it.
pub struct TypingSession {
    passage: Option<Passage>,
    char_state: Vec<Vec<CharState>>,
    word_state: Vec<WordState>,
    active_word: usize,
    active_char: usize,
    status: Status,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
    time_limit: u32,
    remaining_secs: u32,
    total_keystrokes: usize,
    error_count: usize,
    typed_words: Vec<String>,
    generation: u64,
    summarized: bool,
    clock: Arc<dyn Clock>,
}

impl TypingSession {
    pub fn new(time_limit: u32) -> Self {
        Self::with_clock(time_limit, Arc::new(SystemClock))
    }

    pub fn with_clock(time_limit: u32, clock: Arc<dyn Clock>) -> Self {
        let time_limit = time_limit.max(1);
        Self {
            passage: None,
            char_state: Vec::new(),
            word_state: Vec::new(),
            active_word: 0,
            active_char: 0,
            status: Status::Idle,
            started_at: None,
            finished_at: None,
            time_limit,
            remaining_secs: time_limit,
            total_keystrokes: 0,
            error_count: 0,
            typed_words: Vec::new(),
            generation: 0,
            summarized: false,
            clock,
        }
    }

    /// Replace the passage and return to `Idle`.
    pub fn load_passage(&mut self, text: &str) {
        self.passage = Some(Passage::new(text));
        self.status = Status::Idle;
        self.reset_progress();
        self.generation += 1;
        debug!(generation = self.generation, words = self.word_count(), "passage_loaded");
    }

    /// Begin a fresh attempt. Returns `false` when no passage is loaded.
    pub fn start(&mut self) -> bool {
        if self.passage.is_none() {
            return false;
        }
        self.reset_progress();
        self.status = Status::Active;
        self.started_at = Some(self.clock.now());
        if let Some(first) = self.word_state.first_mut() {
            *first = WordState::Current;
        }
        self.generation += 1;
        debug!(generation = self.generation, "session_started");
        true
    }

    /// Discard all progress and start again on the same passage.
    pub fn restart(&mut self) -> bool {
        self.start()
    }

    fn reset_progress(&mut self) {
        let (char_state, word_state) = match &self.passage {
            Some(passage) => (
                passage
                    .words()
                    .map(|w| vec![CharState::Untyped; w.len()])
                    .collect(),
                vec![WordState::Pending; passage.len()],
            ),
            None => (Vec::new(), Vec::new()),
        };
        self.char_state = char_state;
        self.word_state = word_state;
        self.active_word = 0;
        self.active_char = 0;
        self.started_at = None;
        self.finished_at = None;
        self.remaining_secs = self.time_limit;
        self.total_keystrokes = 0;
        self.error_count = 0;
        self.typed_words.clear();
        self.summarized = false;
    }

    /// One second of the countdown.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != Status::Active {
            return TickOutcome::Ignored;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return TickOutcome::Counted {
                remaining: self.remaining_secs,
            };
        }
        match self.finish() {
            Some(summary) => TickOutcome::Expired(summary),
            None => TickOutcome::Ignored,
        }
    }

    /// Judge `ch` against the character under the cursor.
    ///
    /// Returns `false` (and changes nothing) when the session is not active
    /// or the cursor already sits at the end of the current word.
    pub fn type_character(&mut self, ch: char) -> bool {
        if self.status != Status::Active {
            return false;
        }
        let Some(expected) = self
            .passage
            .as_ref()
            .and_then(|p| p.word(self.active_word))
            .and_then(|w| w.get(self.active_char))
            .copied()
        else {
            return false;
        };

        self.total_keystrokes += 1;
        let judged = if ch == expected {
            CharState::Correct
        } else {
            self.error_count += 1;
            CharState::Incorrect(ch)
        };
        if let Some(cell) = self.cell_mut(self.active_word, self.active_char) {
            *cell = judged;
        }
        self.active_char += 1;
        true
    }

    /// Confirm the current word. Only valid once every character has been typed.
    pub fn advance_word(&mut self) -> AdvanceOutcome {
        if self.status != Status::Active {
            return AdvanceOutcome::Rejected;
        }
        let Some(passage) = &self.passage else {
            return AdvanceOutcome::Rejected;
        };
        if self.active_word >= passage.len()
            || self.active_char != passage.word_len(self.active_word)
        {
            return AdvanceOutcome::Rejected;
        }

        let expected: String = passage
            .word(self.active_word)
            .unwrap_or_default()
            .iter()
            .collect();
        let passage_len = passage.len();
        let typed = self.typed_string(self.active_word);

        self.word_state[self.active_word] = if typed == expected {
            WordState::Correct
        } else {
            WordState::Incorrect
        };
        self.typed_words.push(typed);
        self.active_word += 1;
        self.active_char = 0;

        if self.active_word >= passage_len {
            return match self.finish() {
                Some(summary) => AdvanceOutcome::Completed(summary),
                None => AdvanceOutcome::Advanced,
            };
        }
        self.word_state[self.active_word] = WordState::Current;
        AdvanceOutcome::Advanced
    }

    /// Un-type the previous character, or step back into the previous word.
    ///
    /// Error counts are never reversed. Stepping back into a word clears all
    /// of its judgments, so it has to be typed again from scratch.
    pub fn backspace(&mut self) -> bool {
        if self.status != Status::Active {
            return false;
        }

        if self.active_char > 0 {
            self.active_char -= 1;
            let was_judged = self
                .cell_mut(self.active_word, self.active_char)
                .map(|cell| std::mem::take(cell).is_judged())
                .unwrap_or(false);
            if was_judged {
                self.total_keystrokes = self.total_keystrokes.saturating_sub(1);
            }
            return true;
        }

        if self.active_word == 0 {
            return false;
        }

        if let Some(left) = self.word_state.get_mut(self.active_word) {
            *left = WordState::Pending;
        }
        let prev = self.active_word - 1;
        let mut judged = 0;
        if let Some(cells) = self.char_state.get_mut(prev) {
            for cell in cells.iter_mut() {
                if cell.is_judged() {
                    judged += 1;
                }
                *cell = CharState::Untyped;
            }
        }
        if let Some(state) = self.word_state.get_mut(prev) {
            *state = WordState::Current;
        }
        self.typed_words.pop();
        self.total_keystrokes = self.total_keystrokes.saturating_sub(judged);
        self.active_word = prev;
        self.active_char = self.passage.as_ref().map_or(0, |p| p.word_len(prev));
        true
    }

    /// End the session and produce its summary. Only the first call yields one.
    pub fn finish(&mut self) -> Option<ResultSummary> {
        if self.summarized || self.started_at.is_none() {
            return None;
        }
        self.status = Status::Finished;
        self.finished_at = Some(self.clock.now());
        self.summarized = true;
        let summary = self.summary();
        debug!(
            generation = self.generation,
            wpm = summary.wpm,
            accuracy = summary.accuracy,
            "session_finished"
        );
        Some(summary)
    }

    pub fn summary(&self) -> ResultSummary {
        ResultSummary {
            wpm: self.compute_wpm(),
            accuracy: self.compute_accuracy(),
            elapsed_secs: self.elapsed_secs(),
            error_count: self.error_count,
        }
    }

    /// Completed words per elapsed minute.
    pub fn compute_wpm(&self) -> f64 {
        let Some(start) = self.started_at else {
            return 0.0;
        };
        let end = self.finished_at.unwrap_or_else(|| self.clock.now());
        let minutes = end.saturating_duration_since(start).as_secs_f64() / 60.0;
        if minutes <= 0.0 {
            return 0.0;
        }
        self.active_word as f64 / minutes
    }

    pub fn compute_accuracy(&self) -> f64 {
        if self.total_keystrokes == 0 {
            return 100.0;
        }
        let total = self.total_keystrokes as f64;
        ((total - self.error_count as f64) / total * 100.0).clamp(0.0, 100.0)
    }

    pub fn progress_percent(&self) -> f64 {
        match &self.passage {
            Some(p) if !p.is_empty() => self.active_word as f64 / p.len() as f64 * 100.0,
            _ => 0.0,
        }
    }

    /// Seconds consumed from the countdown.
    pub fn elapsed_secs(&self) -> u32 {
        self.time_limit.saturating_sub(self.remaining_secs)
    }

    /// The literal text typed into `word` so far.
    pub fn typed_string(&self, word: usize) -> String {
        let (Some(cells), Some(expected)) = (
            self.char_state.get(word),
            self.passage.as_ref().and_then(|p| p.word(word)),
        ) else {
            return String::new();
        };
        cells
            .iter()
            .zip(expected)
            .filter_map(|(cell, &exp)| match cell {
                CharState::Untyped => None,
                CharState::Correct => Some(exp),
                CharState::Incorrect(actual) => Some(*actual),
            })
            .collect()
    }

    fn cell_mut(&mut self, word: usize, ch: usize) -> Option<&mut CharState> {
        self.char_state.get_mut(word).and_then(|w| w.get_mut(ch))
    }

    pub fn char_state(&self, word: usize, ch: usize) -> Option<CharState> {
        self.char_state.get(word).and_then(|w| w.get(ch)).copied()
    }

    pub fn word_chars(&self, word: usize) -> Option<&[CharState]> {
        self.char_state.get(word).map(Vec::as_slice)
    }

    pub fn word_state(&self, word: usize) -> Option<WordState> {
        self.word_state.get(word).copied()
    }

    pub fn passage(&self) -> Option<&Passage> {
        self.passage.as_ref()
    }

    pub fn word_count(&self) -> usize {
        self.passage.as_ref().map_or(0, Passage::len)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn active_word(&self) -> usize {
        self.active_word
    }

    pub fn active_char(&self) -> usize {
        self.active_char
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn time_limit(&self) -> u32 {
        self.time_limit
    }

    pub fn total_keystrokes(&self) -> usize {
        self.total_keystrokes
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn typed_words(&self) -> &[String] {
        &self.typed_words
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::session::clock::ManualClock;

    fn session_with_clock(text: &str) -> (TypingSession, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let mut session = TypingSession::with_clock(60, clock.clone());
        session.load_passage(text);
        (session, clock)
    }

    fn type_str(session: &mut TypingSession, text: &str) {
        for ch in text.chars() {
            session.type_character(ch);
        }
    }

    #[test]
    fn test_load_passage_is_idle_and_pending() {
        let (session, _) = session_with_clock("cat dog");
        assert_eq!(session.status(), Status::Idle);
        assert_eq!(session.word_state(0), Some(WordState::Pending));
        assert_eq!(session.word_state(1), Some(WordState::Pending));
        assert_eq!(session.char_state(0, 0), Some(CharState::Untyped));
    }

    #[test]
    fn test_start_without_passage_is_noop() {
        let mut session = TypingSession::new(60);
        assert!(!session.start());
        assert_eq!(session.status(), Status::Idle);
        assert_eq!(session.started_at(), None);
    }

    #[test]
    fn test_start_marks_first_word_current() {
        let (mut session, _) = session_with_clock("cat dog");
        assert!(session.start());
        assert_eq!(session.status(), Status::Active);
        assert_eq!(session.word_state(0), Some(WordState::Current));
        assert_eq!(session.word_state(1), Some(WordState::Pending));
        assert_eq!(session.remaining_secs(), 60);
        assert!(session.started_at().is_some());
    }

    #[test]
    fn test_fully_typed_word_stays_current() {
        let (mut session, _) = session_with_clock("hello world");
        session.start();
        type_str(&mut session, "hello");
        assert_eq!(session.active_char(), 5);
        assert_eq!(session.word_state(0), Some(WordState::Current));
        // Extra characters past the end are refused.
        assert!(!session.type_character('x'));
        assert_eq!(session.total_keystrokes(), 5);
    }

    #[test]
    fn test_backspace_undoes_type_character() {
        let (mut session, _) = session_with_clock("abc");
        session.start();
        session.type_character('a');
        for ch in ['b', 'z'] {
            let before = session.active_char();
            session.type_character(ch);
            assert!(session.backspace());
            assert_eq!(session.active_char(), before);
            assert_eq!(session.char_state(0, before), Some(CharState::Untyped));
        }
    }

    #[test]
    fn test_backspace_keeps_error_count() {
        let (mut session, _) = session_with_clock("abc");
        session.start();
        session.type_character('x');
        session.backspace();
        assert_eq!(session.error_count(), 1);
        assert_eq!(session.total_keystrokes(), 0);
        // No keystrokes left on record, so accuracy reads 100.
        assert_eq!(session.compute_accuracy(), 100.0);
        session.type_character('a');
        assert_eq!(session.compute_accuracy(), 0.0);
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let (mut session, _) = session_with_clock("abc");
        session.start();
        assert!(!session.backspace());
        assert_eq!(session.active_word(), 0);
        assert_eq!(session.active_char(), 0);
    }

    #[test]
    fn test_backspace_across_word_boundary() {
        let (mut session, _) = session_with_clock("cat dog");
        session.start();
        type_str(&mut session, "cat");
        session.advance_word();
        assert_eq!(session.total_keystrokes(), 3);
        assert_eq!(session.typed_words(), ["cat"]);

        assert!(session.backspace());
        assert_eq!(session.active_word(), 0);
        assert_eq!(session.active_char(), 3);
        assert_eq!(session.word_state(0), Some(WordState::Current));
        assert_eq!(session.word_state(1), Some(WordState::Pending));
        assert_eq!(session.word_chars(0), Some(&[CharState::Untyped; 3][..]));
        assert_eq!(session.total_keystrokes(), 0);
        assert!(session.typed_words().is_empty());

        // Backspacing through the cleared word does not go negative.
        for _ in 0..3 {
            assert!(session.backspace());
        }
        assert_eq!(session.total_keystrokes(), 0);
        assert_eq!(session.active_char(), 0);

        type_str(&mut session, "cat");
        session.advance_word();
        assert_eq!(session.word_state(0), Some(WordState::Correct));
    }

    #[test]
    fn test_advance_over_cleared_word_is_incorrect() {
        let (mut session, _) = session_with_clock("cat dog");
        session.start();
        type_str(&mut session, "cat");
        session.advance_word();
        session.backspace();
        assert_eq!(session.advance_word(), AdvanceOutcome::Advanced);
        assert_eq!(session.word_state(0), Some(WordState::Incorrect));
        assert_eq!(session.typed_words(), [""]);
    }

    #[test]
    fn test_accuracy_is_100_without_keystrokes() {
        let (mut session, _) = session_with_clock("cat");
        assert_eq!(session.compute_accuracy(), 100.0);
        session.start();
        assert_eq!(session.compute_accuracy(), 100.0);
    }

    #[test]
    fn test_wpm_zero_before_start() {
        let (session, clock) = session_with_clock("cat dog");
        clock.advance_secs(30);
        assert_eq!(session.compute_wpm(), 0.0);
    }

    #[test]
    fn test_scenario_cat_dog() {
        let (mut session, clock) = session_with_clock("cat dog");
        session.start();
        type_str(&mut session, "cat");
        assert_eq!(session.advance_word(), AdvanceOutcome::Advanced);
        clock.advance_secs(6);
        type_str(&mut session, "dog");
        assert_matches!(session.advance_word(), AdvanceOutcome::Completed(summary) => {
            assert_eq!(summary.error_count, 0);
            assert_eq!(summary.accuracy, 100.0);
            assert!((summary.wpm - 20.0).abs() < 1e-9);
        });
        assert_eq!(session.word_state(0), Some(WordState::Correct));
        assert_eq!(session.word_state(1), Some(WordState::Correct));
        assert_eq!(session.error_count(), 0);
        assert_eq!(session.total_keystrokes(), 6);
        assert_eq!(session.status(), Status::Finished);
        assert_eq!(session.compute_accuracy(), 100.0);
    }

    #[test]
    fn test_scenario_single_typo() {
        let (mut session, _) = session_with_clock("cat");
        session.start();
        type_str(&mut session, "cxt");
        assert_eq!(
            session.word_chars(0),
            Some(&[CharState::Correct, CharState::Incorrect('x'), CharState::Correct][..])
        );
        assert_matches!(session.advance_word(), AdvanceOutcome::Completed(_));
        assert_eq!(session.word_state(0), Some(WordState::Incorrect));
        assert_eq!(session.error_count(), 1);
        assert_eq!(session.total_keystrokes(), 3);
        assert!((session.compute_accuracy() - 66.666).abs() < 0.01);
        assert_eq!(session.typed_words(), ["cxt"]);
    }

    #[test]
    fn test_scenario_timer_expiry() {
        let (mut session, clock) = session_with_clock("a b c d e f g h");
        session.start();
        for word in ["a", "b", "c", "d", "e"] {
            type_str(&mut session, word);
            session.advance_word();
        }
        assert_eq!(session.active_word(), 5);

        let mut expired = Vec::new();
        for _ in 0..60 {
            clock.advance_secs(1);
            if let TickOutcome::Expired(summary) = session.tick() {
                expired.push(summary);
            }
        }
        assert_eq!(session.status(), Status::Finished);
        assert_eq!(expired.len(), 1);
        assert!((expired[0].wpm - 5.0).abs() < 1e-9);
        assert_eq!(expired[0].elapsed_secs, 60);

        clock.advance_secs(1);
        assert_eq!(session.tick(), TickOutcome::Ignored);
        assert_eq!(session.finish(), None);
        assert!(!session.type_character('f'));
    }

    #[test]
    fn test_restart_discards_progress() {
        let (mut session, _) = session_with_clock("one two three four five");
        session.start();
        for word in ["one", "two", "thr3e"] {
            type_str(&mut session, word);
            session.advance_word();
        }
        session.tick();
        assert_eq!(session.active_word(), 3);
        let generation = session.generation();

        assert!(session.restart());
        assert_eq!(session.active_word(), 0);
        assert_eq!(session.active_char(), 0);
        assert_eq!(session.remaining_secs(), 60);
        assert_eq!(session.total_keystrokes(), 0);
        assert_eq!(session.error_count(), 0);
        assert!(session.typed_words().is_empty());
        assert!(session.generation() > generation);
        for w in 0..5 {
            let expected = if w == 0 { WordState::Current } else { WordState::Pending };
            assert_eq!(session.word_state(w), Some(expected));
            assert!(session.word_chars(w).unwrap().iter().all(|c| !c.is_judged()));
        }
    }

    #[test]
    fn test_load_passage_resets_finished_session() {
        let (mut session, _) = session_with_clock("a");
        session.start();
        session.type_character('a');
        session.advance_word();
        assert_eq!(session.status(), Status::Finished);

        session.load_passage("b c");
        assert_eq!(session.status(), Status::Idle);
        assert_eq!(session.word_count(), 2);
        assert_eq!(session.compute_wpm(), 0.0);
        assert_eq!(session.remaining_secs(), 60);
    }

    #[test]
    fn test_tick_counts_down() {
        let (mut session, _) = session_with_clock("a");
        assert_eq!(session.tick(), TickOutcome::Ignored);
        session.start();
        assert_eq!(session.tick(), TickOutcome::Counted { remaining: 59 });
        assert_eq!(session.elapsed_secs(), 1);
    }

    #[test]
    fn test_empty_words_advance_immediately() {
        let (mut session, _) = session_with_clock("a  b");
        session.start();
        session.type_character('a');
        session.advance_word();
        assert_eq!(session.word_state(1), Some(WordState::Current));
        assert!(!session.type_character('b'));
        assert_eq!(session.advance_word(), AdvanceOutcome::Advanced);
        assert_eq!(session.word_state(1), Some(WordState::Correct));
    }

    #[test]
    fn test_progress_percent() {
        let (mut session, _) = session_with_clock("a b c d");
        session.start();
        session.type_character('a');
        session.advance_word();
        assert_eq!(session.progress_percent(), 25.0);
    }

    #[test]
    fn test_out_of_range_lookups() {
        let (session, _) = session_with_clock("a");
        assert_eq!(session.word_state(9), None);
        assert_eq!(session.char_state(0, 9), None);
        assert_eq!(session.typed_string(9), "");
    }

    #[test]
    fn test_zero_time_limit_clamped() {
        let session = TypingSession::new(0);
        assert_eq!(session.time_limit(), 1);
    }
}
