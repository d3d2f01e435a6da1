use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::reporter::DisplayStats;
use crate::session::state::Status;
use crate::ui::theme::Theme;

/// WPM / accuracy / timer row.
pub struct StatsHeader<'a> {
    stats: &'a DisplayStats,
    status: Status,
    theme: &'a Theme,
}

impl<'a> StatsHeader<'a> {
    pub fn new(stats: &'a DisplayStats, status: Status, theme: &'a Theme) -> Self {
        Self {
            stats,
            status,
            theme,
        }
    }
}

fn status_label(status: Status) -> &'static str {
    match status {
        Status::Idle => "ready",
        Status::Active => "typing",
        Status::Finished => "done",
    }
}

impl Widget for StatsHeader<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let label = Style::default().fg(colors.muted());
        let value = Style::default()
            .fg(colors.accent())
            .add_modifier(Modifier::BOLD);

        let line = Line::from(vec![
            Span::styled("WPM ", label),
            Span::styled(self.stats.wpm.clone(), value),
            Span::styled("   Accuracy ", label),
            Span::styled(self.stats.accuracy.clone(), value),
            Span::styled("   Time ", label),
            Span::styled(self.stats.timer.clone(), value),
            Span::styled(format!("   [{}]", status_label(self.status)), label),
        ]);

        let block = Block::bordered()
            .title(" TypeType ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(line)
            .alignment(Alignment::Center)
            .block(block)
            .render(area, buf);
    }
}
