use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::app::PeerFeed;
use crate::ui::theme::Theme;

/// Informational list of what other typists are doing.
pub struct PeerPanel<'a> {
    feed: &'a PeerFeed,
    connected: bool,
    theme: &'a Theme,
}

impl<'a> PeerPanel<'a> {
    pub fn new(feed: &'a PeerFeed, connected: bool, theme: &'a Theme) -> Self {
        Self {
            feed,
            connected,
            theme,
        }
    }
}

impl Widget for PeerPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let muted = Style::default().fg(colors.muted());

        let lines: Vec<Line> = if !self.connected {
            vec![Line::styled("offline", muted)]
        } else if self.feed.is_empty() {
            vec![Line::styled("no one else is typing", muted)]
        } else {
            self.feed
                .lines()
                .map(|l| Line::styled(l.to_string(), Style::default().fg(colors.fg())))
                .collect()
        };

        let block = Block::bordered()
            .title(" Others ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
