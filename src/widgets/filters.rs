use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use crate::filter::{FilterSide, FilteredViews, Threshold};
use crate::ingest::TimeSeries;
use crate::statistics::format_metric;

use super::datatable::DataTable;

/// Colors shared by the filter views.
#[derive(Clone, Copy)]
pub struct FilterColors {
    pub header: Color,
    pub border: Color,
    pub slider: Color,
    pub warning: Color,
    pub info: Color,
}

/// One threshold with its bounds, drawn as a gauge.
pub struct Slider<'a> {
    label: &'a str,
    threshold: &'a Threshold,
    selected: bool,
    color: Color,
}

impl<'a> Slider<'a> {
    pub fn new(label: &'a str, threshold: &'a Threshold, selected: bool, color: Color) -> Self {
        Self {
            label,
            threshold,
            selected,
            color,
        }
    }
}

impl Widget for Slider<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (min, max) = self.threshold.bounds();
        let marker = if self.selected { "▶ " } else { "  " };
        let title_style = if self.selected {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled(format!("{}{}", marker, self.label), title_style))
                    .title_bottom(Line::from(format!(
                        " {} .. {} ",
                        format_metric(min),
                        format_metric(max)
                    ))),
            )
            .gauge_style(Style::default().fg(self.color))
            .ratio(self.threshold.ratio().clamp(0.0, 1.0))
            .label(format_metric(self.threshold.value()))
            .render(area, buf);
    }
}

/// Both threshold sliders above their result tables.
pub struct FiltersPanel<'a> {
    pub lower: &'a Threshold,
    pub upper: &'a Threshold,
    pub views: &'a FilteredViews,
    pub selected: FilterSide,
    pub offsets: (usize, usize),
    pub colors: FilterColors,
}

impl Widget for FiltersPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [sliders, tables] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Fill(1)])
            .areas(area);
        let halves = |r: Rect| -> [Rect; 2] {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(r)
        };
        let [low_slider, high_slider] = halves(sliders);
        let [low_table, high_table] = halves(tables);

        Slider::new(
            "Minimum value",
            self.lower,
            self.selected == FilterSide::Lower,
            self.colors.slider,
        )
        .render(low_slider, buf);
        Slider::new(
            "Maximum value",
            self.upper,
            self.selected == FilterSide::Upper,
            self.colors.slider,
        )
        .render(high_slider, buf);

        DataTable::new(self.views.above.frame())
            .title(format!("variable > {}", format_metric(self.lower.value())))
            .colors(self.colors.header, self.colors.border)
            .offset(self.offsets.0)
            .render(low_table, buf);
        DataTable::new(self.views.below.frame())
            .title(format!("variable < {}", format_metric(self.upper.value())))
            .colors(self.colors.header, self.colors.border)
            .offset(self.offsets.1)
            .render(high_table, buf);
    }
}

/// Shown instead of the sliders when every value is the same.
pub struct NoVariation<'a> {
    pub value: f64,
    pub series: &'a TimeSeries,
    pub offset: usize,
    pub colors: FilterColors,
}

impl Widget for NoVariation<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [message, table] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Fill(1)])
            .areas(area);

        Paragraph::new(vec![
            Line::from(Span::styled(
                format!("All values are equal: {}", format_metric(self.value)),
                Style::default().fg(self.colors.warning).bold(),
            )),
            Line::from(Span::styled(
                crate::NO_VARIATION_HINT,
                Style::default().fg(self.colors.info),
            )),
        ])
        .wrap(Wrap { trim: true })
        .render(message, buf);

        DataTable::new(self.series.frame())
            .colors(self.colors.header, self.colors.border)
            .offset(self.offset)
            .render(table, buf);
    }
}
