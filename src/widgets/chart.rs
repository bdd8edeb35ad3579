//! Time-series chart of the measured variable.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
};

use crate::chart_data::{format_x_label, ChartData, ChartKind};

pub struct SeriesChart<'a> {
    data: &'a ChartData,
    kind: ChartKind,
    color: Color,
    axis_color: Color,
    border_color: Color,
}

impl<'a> SeriesChart<'a> {
    pub fn new(data: &'a ChartData, kind: ChartKind) -> Self {
        Self {
            data,
            kind,
            color: Color::Reset,
            axis_color: Color::Reset,
            border_color: Color::Reset,
        }
    }

    pub fn colors(mut self, series: Color, axis: Color, border: Color) -> Self {
        self.color = series;
        self.axis_color = axis;
        self.border_color = border;
        self
    }

    fn y_bounds(&self) -> [f64; 2] {
        let [lo, hi] = self.data.y_bounds;
        match self.kind {
            // Bars grow from zero, so zero must be on the axis.
            ChartKind::Bar => [lo.min(0.0), hi.max(0.0)],
            _ => [lo, hi],
        }
    }
}

fn format_y_label(v: f64) -> String {
    if v.abs() >= 1e6 || (v.abs() < 1e-2 && v != 0.0) {
        format!("{:.2e}", v)
    } else {
        format!("{:.2}", v)
    }
}

impl Widget for SeriesChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_color))
            .title(format!(" {} chart ", self.kind.as_str()));

        if self.data.is_empty() {
            Paragraph::new("No numeric values to plot")
                .style(Style::default().fg(Color::DarkGray))
                .centered()
                .block(block)
                .render(area, buf);
            return;
        }

        let style = Style::default().fg(self.color);
        let points = self.data.points.as_slice();
        let datasets = match self.kind {
            ChartKind::Line => vec![Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(style)
                .data(points)],
            // Bar strokes are clipped at the lower bound, which fills the region under the line.
            ChartKind::Area => vec![
                Dataset::default()
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Bar)
                    .style(style.add_modifier(ratatui::style::Modifier::DIM))
                    .data(points),
                Dataset::default()
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(style)
                    .data(points),
            ],
            ChartKind::Bar => vec![Dataset::default()
                .marker(symbols::Marker::HalfBlock)
                .graph_type(GraphType::Bar)
                .style(style)
                .data(points)],
        };

        let [x_min, x_max] = self.data.x_bounds;
        let [y_min, y_max] = self.y_bounds();
        let label_style = Style::default().fg(self.axis_color);
        let kind = self.data.x_axis_kind;

        let x_labels = vec![
            Span::styled(format_x_label(x_min, kind), label_style),
            Span::styled(format_x_label((x_min + x_max) / 2.0, kind), label_style),
            Span::styled(format_x_label(x_max, kind), label_style),
        ];
        let y_labels = vec![
            Span::styled(format_y_label(y_min), label_style),
            Span::styled(format_y_label((y_min + y_max) / 2.0), label_style),
            Span::styled(format_y_label(y_max), label_style),
        ];

        Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .bounds([x_min, x_max])
                    .style(label_style)
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .bounds([y_min, y_max])
                    .style(label_style)
                    .labels(y_labels),
            )
            .legend_position(None)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart_data::XAxisKind;

    fn data() -> ChartData {
        ChartData {
            points: vec![(0.0, 2.0), (1.0, 4.0)],
            x_axis_kind: XAxisKind::RowIndex,
            x_bounds: [0.0, 1.0],
            y_bounds: [2.0, 4.0],
        }
    }

    #[test]
    fn bar_bounds_include_zero() {
        let d = data();
        assert_eq!(SeriesChart::new(&d, ChartKind::Bar).y_bounds(), [0.0, 4.0]);
        assert_eq!(SeriesChart::new(&d, ChartKind::Line).y_bounds(), [2.0, 4.0]);
    }

    #[test]
    fn renders_every_kind() {
        let d = data();
        for kind in ChartKind::ALL {
            let area = Rect::new(0, 0, 40, 12);
            let mut buf = Buffer::empty(area);
            SeriesChart::new(&d, kind).render(area, &mut buf);
        }
    }

    #[test]
    fn y_labels_use_two_decimals() {
        assert_eq!(format_y_label(21.666), "21.67");
        assert_eq!(format_y_label(2_000_000.0), "2.00e6");
    }
}
