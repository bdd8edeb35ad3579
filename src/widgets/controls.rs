use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

/// Key hint bar along the bottom of the screen.
pub struct Controls {
    pub hints: Vec<(&'static str, &'static str)>,
    pub status: Option<String>,
    pub bg: Color,
    pub dimmed: bool,
}

impl Controls {
    pub fn new(hints: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            hints,
            status: None,
            bg: Color::DarkGray,
            dimmed: false,
        }
    }

    pub fn with_status(mut self, status: Option<String>) -> Self {
        self.status = status;
        self
    }

    pub fn with_bg(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut constraints = self.hints.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });
        if let Some(status) = &self.status {
            constraints.push(Constraint::Length(status.chars().count() as u16 + 2));
        }
        constraints.push(Constraint::Fill(1));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        let base_style = if self.dimmed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        for (i, (key, action)) in self.hints.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(base_style.bold())
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(base_style.bg(self.bg))
                .render(layout[j + 1], buf);
        }

        let mut fill_idx = self.hints.len() * 2;
        if let Some(status) = &self.status {
            Paragraph::new(status.as_str())
                .style(base_style.bg(self.bg))
                .right_aligned()
                .render(layout[fill_idx], buf);
            fill_idx += 1;
        }

        Paragraph::new("")
            .style(base_style.bg(self.bg))
            .render(layout[fill_idx], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_hints_and_status() {
        let controls = Controls::new(vec![("o", "Open"), ("q", "Quit")])
            .with_status(Some("data.csv".to_string()));
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        (&controls).render(area, &mut buf);
        let line: String = (0..area.width).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert!(line.contains("Open"));
        assert!(line.contains("Quit"));
        assert!(line.contains("data.csv"));
    }
}
