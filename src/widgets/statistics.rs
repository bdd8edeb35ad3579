use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, Widget},
};

use crate::statistics::{format_metric, Summary};

/// Summary table on the left, headline metrics on the right.
pub struct StatisticsPanel<'a> {
    summary: &'a Summary,
    accent: Color,
    border: Color,
}

impl<'a> StatisticsPanel<'a> {
    pub fn new(summary: &'a Summary) -> Self {
        Self {
            summary,
            accent: Color::Reset,
            border: Color::Reset,
        }
    }

    pub fn colors(mut self, accent: Color, border: Color) -> Self {
        self.accent = accent;
        self.border = border;
        self
    }
}

/// `count` is a whole number; everything else is shown with six decimals like a describe table.
fn summary_cell(label: &str, value: f64) -> String {
    if label == "count" {
        format!("{}", value as u64)
    } else {
        format!("{:.6}", value)
    }
}

impl Widget for StatisticsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [left, right] = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(area);

        let rows = self.summary.rows().map(|(label, value)| {
            Row::new(vec![label.to_string(), summary_cell(label, value)])
        });
        Table::new(rows, [Constraint::Length(8), Constraint::Fill(1)])
            .header(Row::new(vec!["", "variable"]).style(Style::default().fg(self.accent)))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.border))
                    .title(" Statistical summary "),
            )
            .render(left, buf);

        let metrics = [
            ("Mean", self.summary.mean),
            ("Maximum", self.summary.max),
            ("Minimum", self.summary.min),
            ("Standard deviation", self.summary.std),
        ];
        let lines: Vec<Line> = metrics
            .iter()
            .flat_map(|(label, value)| {
                [
                    Line::from(Span::styled(*label, Style::default().fg(Color::DarkGray))),
                    Line::from(Span::styled(
                        format_metric(*value),
                        Style::default().fg(self.accent).bold(),
                    )),
                    Line::from(""),
                ]
            })
            .collect();
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.border))
                    .title(" Metrics "),
            )
            .render(right, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_is_integral() {
        assert_eq!(summary_cell("count", 3.0), "3");
        assert_eq!(summary_cell("mean", 21.0 + 2.0 / 3.0), "21.666667");
    }
}
