use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Map, MapResolution, Points},
        Block, Borders, Widget,
    },
};

use crate::site::SiteInfo;

/// World map centred on the monitoring site, with a marker at its coordinates.
pub struct LocationMap<'a> {
    site: &'a SiteInfo,
    marker_color: Color,
    border_color: Color,
}

impl<'a> LocationMap<'a> {
    pub fn new(site: &'a SiteInfo) -> Self {
        Self {
            site,
            marker_color: Color::Red,
            border_color: Color::Reset,
        }
    }

    pub fn colors(mut self, marker: Color, border: Color) -> Self {
        self.marker_color = marker;
        self.border_color = border;
        self
    }
}

impl Widget for LocationMap<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let view = self.site.map_view();
        let site = self.site;
        let marker_color = self.marker_color;
        Canvas::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.border_color))
                    .title(format!(" Sensor location - {} ", site.place)),
            )
            .marker(Marker::Braille)
            .x_bounds(view.x_bounds)
            .y_bounds(view.y_bounds)
            .paint(move |ctx| {
                ctx.draw(&Map {
                    color: Color::DarkGray,
                    resolution: MapResolution::High,
                });
                ctx.layer();
                ctx.draw(&Points {
                    coords: &[(site.longitude, site.latitude)],
                    color: marker_color,
                });
                ctx.print(
                    site.longitude,
                    site.latitude,
                    Span::styled(" ●", Style::default().fg(marker_color)),
                );
            })
            .render(area, buf);
    }
}
