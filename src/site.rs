//! Fixed page text and the monitoring site shown on the map.

use crate::config::SiteConfig;

pub const TITLE: &str = "Urban Sensor Data Analysis";
pub const WELCOME: &str = "Load a CSV file with sensor readings to explore them: a chart of the \
measured variable, descriptive statistics, threshold filters with CSV export, and information \
about the monitoring site.";
pub const FOOTER: [&str; 2] = [
    "Developed for urban sensor data analysis",
    "Universidad EAFIT - Medellín, Colombia",
];

/// Below this span the world map has no coastline left to draw.
const MIN_MAP_SPAN_DEG: f64 = 4.0;

/// Longitude/latitude window of the map canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

/// Where the readings come from.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteInfo {
    pub place: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: String,
    pub zoom: u8,
    pub sensor_type: String,
    pub measured_variable: String,
    pub frequency: String,
    pub context: String,
}

impl From<&SiteConfig> for SiteInfo {
    fn from(c: &SiteConfig) -> Self {
        Self {
            place: c.place.clone(),
            latitude: c.latitude,
            longitude: c.longitude,
            altitude: c.altitude.clone(),
            zoom: c.zoom,
            sensor_type: c.sensor_type.clone(),
            measured_variable: c.measured_variable.clone(),
            frequency: c.frequency.clone(),
            context: c.context.clone(),
        }
    }
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self::from(&SiteConfig::default())
    }
}

impl SiteInfo {
    /// Degrees of longitude visible at this zoom level.
    pub fn map_span(&self) -> f64 {
        (360.0 / 2f64.powi(self.zoom as i32)).max(MIN_MAP_SPAN_DEG)
    }

    /// Window centred on the marker. Latitude gets half the span, matching a wide terminal cell.
    pub fn map_view(&self) -> MapView {
        let half = self.map_span() / 2.0;
        MapView {
            x_bounds: [
                (self.longitude - half).max(-180.0),
                (self.longitude + half).min(180.0),
            ],
            y_bounds: [
                (self.latitude - half / 2.0).max(-90.0),
                (self.latitude + half / 2.0).min(90.0),
            ],
        }
    }

    pub fn coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Label/value rows for the location section.
    pub fn location_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Place", self.place.clone()),
            ("Coordinates", self.coordinates()),
            ("Altitude", self.altitude.clone()),
        ]
    }

    /// Label/value rows for the sensor section.
    pub fn sensor_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Type", self.sensor_type.clone()),
            ("Variable", self.measured_variable.clone()),
            ("Frequency", self.frequency.clone()),
            ("Context", self.context.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_site_is_eafit() {
        let site = SiteInfo::default();
        assert_eq!(site.place, "Universidad EAFIT");
        assert_eq!(site.coordinates(), "6.2006, -75.5783");
    }

    #[test]
    fn span_halves_per_zoom_level_until_floor() {
        let mut site = SiteInfo::default();
        site.zoom = 0;
        assert_eq!(site.map_span(), 360.0);
        site.zoom = 2;
        assert_eq!(site.map_span(), 90.0);
        site.zoom = 15;
        assert_eq!(site.map_span(), MIN_MAP_SPAN_DEG);
    }

    #[test]
    fn view_is_centred_and_clamped() {
        let mut site = SiteInfo::default();
        site.zoom = 3;
        let view = site.map_view();
        let centre = (view.x_bounds[0] + view.x_bounds[1]) / 2.0;
        assert!((centre - site.longitude).abs() < 1e-9);

        site.zoom = 0;
        let view = site.map_view();
        assert_eq!(view.x_bounds[0], -180.0);
        assert!((view.x_bounds[1] - 104.4217).abs() < 1e-9);
    }
}
