use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use crate::session::result::ResultSummary;
use crate::ui::theme::Theme;

/// Final results popup.
pub struct ResultsPanel<'a> {
    result: &'a ResultSummary,
    notice: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> ResultsPanel<'a> {
    pub fn new(result: &'a ResultSummary, notice: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            result,
            notice,
            theme,
        }
    }

    fn rows(&self) -> [(&'static str, String); 4] {
        [
            ("WPM", self.result.rounded_wpm().to_string()),
            ("Accuracy", format!("{}%", self.result.rounded_accuracy())),
            ("Time", format!("{}s", self.result.elapsed_secs)),
            ("Errors", self.result.error_count.to_string()),
        ]
    }
}

impl Widget for ResultsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let label = Style::default().fg(colors.muted());
        let value = Style::default()
            .fg(colors.success())
            .add_modifier(Modifier::BOLD);

        let mut lines: Vec<Line> = self
            .rows()
            .into_iter()
            .map(|(name, v)| {
                Line::from(vec![
                    Span::styled(format!("  {name:<10}"), label),
                    Span::styled(v, value),
                ])
            })
            .collect();

        if let Some(notice) = self.notice {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("  {notice}"),
                Style::default().fg(colors.accent()),
            )));
        }

        let block = Block::bordered()
            .title(" Results ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));

        Clear.render(area, buf);
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_rounded() {
        let result = ResultSummary {
            wpm: 37.6,
            accuracy: 91.2,
            elapsed_secs: 60,
            error_count: 7,
        };
        let theme = Theme::default();
        let panel = ResultsPanel::new(&result, None, &theme);
        let rows = panel.rows();
        assert_eq!(rows[0].1, "38");
        assert_eq!(rows[1].1, "91%");
        assert_eq!(rows[2].1, "60s");
        assert_eq!(rows[3].1, "7");
    }
}
