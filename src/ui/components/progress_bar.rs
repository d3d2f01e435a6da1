use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::session::state::TypingSession;
use crate::ui::theme::Theme;

/// Passage completion bar, filled by completed words.
pub struct PassageProgress<'a> {
    session: &'a TypingSession,
    theme: &'a Theme,
}

impl<'a> PassageProgress<'a> {
    pub fn new(session: &'a TypingSession, theme: &'a Theme) -> Self {
        Self { session, theme }
    }

    fn ratio(&self) -> f64 {
        (self.session.progress_percent() / 100.0).clamp(0.0, 1.0)
    }

    fn label(&self) -> String {
        format!(
            "{}/{} words",
            self.session.active_word(),
            self.session.word_count()
        )
    }
}

impl Widget for PassageProgress<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.label()))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio() * inner.width as f64) as u16;
        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().bg(colors.bar_filled())
            } else {
                Style::default().bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let pct = format!("{:.0}%", self.ratio() * 100.0);
        let pct_x = inner.x + (inner.width.saturating_sub(pct.len() as u16)) / 2;
        buf.set_string(pct_x, inner.y, &pct, Style::default().fg(colors.fg()));
    }
}
