use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::config::CursorMode;
use crate::session::input::CharState;
use crate::session::state::{TypingSession, WordState};
use crate::ui::theme::{Theme, ThemeColors};

/// How a single passage character should look.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CellKind {
    Pending,
    /// Untyped character inside the current word (highlight mode).
    InCurrentWord,
    Cursor,
    Correct,
    Incorrect,
}

fn cell_kind(
    state: CharState,
    word_state: WordState,
    char_idx: usize,
    active_char: usize,
    mode: CursorMode,
) -> CellKind {
    if word_state == WordState::Current && mode == CursorMode::Caret {
        // The caret sits on the last typed character.
        if char_idx == active_char.saturating_sub(1) {
            return CellKind::Cursor;
        }
    }
    match state {
        CharState::Correct => CellKind::Correct,
        CharState::Incorrect(_) => CellKind::Incorrect,
        CharState::Untyped if word_state == WordState::Current => match mode {
            CursorMode::Highlight => CellKind::InCurrentWord,
            CursorMode::Caret => CellKind::Pending,
        },
        CharState::Untyped => CellKind::Pending,
    }
}

fn cell_style(kind: CellKind, word_state: WordState, colors: &ThemeColors) -> Style {
    let style = match kind {
        CellKind::Pending => Style::default().fg(colors.text_pending()),
        CellKind::InCurrentWord => Style::default()
            .fg(colors.fg())
            .bg(colors.word_current_bg()),
        CellKind::Cursor => Style::default()
            .fg(colors.text_cursor_fg())
            .bg(colors.text_cursor_bg()),
        CellKind::Correct => Style::default().fg(colors.text_correct()),
        CellKind::Incorrect => Style::default()
            .fg(colors.text_incorrect())
            .bg(colors.text_incorrect_bg()),
    };
    if word_state == WordState::Incorrect {
        style.add_modifier(Modifier::UNDERLINED)
    } else {
        style
    }
}

/// Renders the passage as a projection of the session's character grid.
pub struct TypingArea<'a> {
    session: &'a TypingSession,
    mode: CursorMode,
    theme: &'a Theme,
}

impl<'a> TypingArea<'a> {
    pub fn new(session: &'a TypingSession, mode: CursorMode, theme: &'a Theme) -> Self {
        Self {
            session,
            mode,
            theme,
        }
    }

    fn spans(&self) -> Vec<Span<'static>> {
        let colors = &self.theme.colors;
        let Some(passage) = self.session.passage() else {
            return Vec::new();
        };
        let active_char = self.session.active_char();
        let mut spans = Vec::new();

        for (w, word) in passage.words().enumerate() {
            if w > 0 {
                spans.push(Span::raw(" "));
            }
            let word_state = self.session.word_state(w).unwrap_or(WordState::Pending);
            for (c, &expected) in word.iter().enumerate() {
                let state = self.session.char_state(w, c).unwrap_or_default();
                let kind = cell_kind(state, word_state, c, active_char, self.mode);
                // Mistyped cells show what was typed.
                let shown = match state {
                    CharState::Incorrect(actual) if !actual.is_whitespace() => actual,
                    _ => expected,
                };
                spans.push(Span::styled(
                    shown.to_string(),
                    cell_style(kind, word_state, colors),
                ));
            }
        }
        spans
    }
}

impl Widget for TypingArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Passage ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        let paragraph = Paragraph::new(Line::from(self.spans()))
            .block(block)
            .wrap(Wrap { trim: false });

        paragraph.render(area, buf);
    }
}
