use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::site::SiteInfo;

/// "Site info" tab: location on the left, sensor details on the right.
pub struct SiteInfoPanel<'a> {
    site: &'a SiteInfo,
    label_color: Color,
    border_color: Color,
}

impl<'a> SiteInfoPanel<'a> {
    pub fn new(site: &'a SiteInfo) -> Self {
        Self {
            site,
            label_color: Color::Reset,
            border_color: Color::Reset,
        }
    }

    pub fn colors(mut self, label: Color, border: Color) -> Self {
        self.label_color = label;
        self.border_color = border;
        self
    }

    fn section(&self, title: &str, rows: Vec<(&'static str, String)>) -> Paragraph<'static> {
        let lines: Vec<Line> = rows
            .into_iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::raw("- "),
                    Span::styled(format!("{}: ", label), Style::default().fg(self.label_color).bold()),
                    Span::raw(value),
                ])
            })
            .collect();
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.border_color))
                .title(format!(" {} ", title)),
        )
    }
}

impl Widget for SiteInfoPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [left, right] = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(area);
        self.section("Location", self.site.location_rows())
            .render(left, buf);
        self.section("Sensor details", self.site.sensor_rows())
            .render(right, buf);
    }
}
