use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use sensordash_cli::{Args, CompressionFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use supports_color::Stream;

use crate::ingest::ValueColumn;

pub const APP_NAME: &str = "sensordash";
pub const CONFIG_FILE: &str = "config.toml";
pub const CONFIG_VERSION: &str = "0.1";

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Write the commented default template to `config.toml`
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path(CONFIG_FILE);

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub version: String,
    pub ingest: IngestConfig,
    pub display: DisplayConfig,
    pub filters: FiltersConfig,
    pub export: ExportConfig,
    pub site: SiteConfig,
    pub logging: LoggingConfig,
    pub theme: ThemeConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct IngestConfig {
    /// Measured column by name; unset means the positional rule.
    pub value_column: Option<String>,
    /// `gzip`, `zstd`, `bzip2` or `xz`; unset means detect from the extension.
    pub compression: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub chart_height: u16,
    pub show_raw_data: bool,
    pub event_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FiltersConfig {
    /// Key presses needed to move a threshold from min to max.
    pub slider_steps: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
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

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// `tracing` filter directive, e.g. `info` or `sensordash=debug`.
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ThemeConfig {
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColorConfig {
    pub primary: String,
    pub secondary: String,
    pub success: String,
    pub error: String,
    pub warning: String,
    pub info: String,
    pub dimmed: String,
    pub controls_bg: String,
    pub text_primary: String,
    pub table_header: String,
    pub table_border: String,
    pub chart_line: String,
    pub threshold: String,
    pub map_marker: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            ingest: IngestConfig::default(),
            display: DisplayConfig::default(),
            filters: FiltersConfig::default(),
            export: ExportConfig::default(),
            site: SiteConfig::default(),
            logging: LoggingConfig::default(),
            theme: ThemeConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            chart_height: 15,
            show_raw_data: false,
            event_poll_interval_ms: 25,
        }
    }
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self { slider_steps: 100 }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            place: "Universidad EAFIT".to_string(),
            latitude: 6.2006,
            longitude: -75.5783,
            altitude: "~1.495 m.s.n.m".to_string(),
            zoom: 15,
            sensor_type: "ESP32".to_string(),
            measured_variable: "According to configuration".to_string(),
            frequency: "Configurable".to_string(),
            context: "University campus".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            primary: "#1b3c59".to_string(),
            secondary: "#4bb47e".to_string(),
            success: "green".to_string(),
            error: "red".to_string(),
            warning: "yellow".to_string(),
            info: "cyan".to_string(),
            dimmed: "dark_gray".to_string(),
            controls_bg: "indexed(236)".to_string(),
            text_primary: "white".to_string(),
            table_header: "#4bb47e".to_string(),
            table_border: "#1b3c59".to_string(),
            chart_line: "#4bb47e".to_string(),
            threshold: "yellow".to_string(),
            map_marker: "red".to_string(),
        }
    }
}

/// Assign each field of `$other` that differs from `$default`.
macro_rules! merge_fields {
    ($self:ident, $other:ident, $default:ident; $($field:ident),+ $(,)?) => {
        $(
            if $other.$field != $default.$field {
                $self.$field = $other.$field;
            }
        )+
    };
}

impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let config_manager = ConfigManager::new(app_name)?;
        Self::load_from_path(&config_manager.config_path(CONFIG_FILE))
    }

    /// Defaults overlaid with the file at `path`, if it exists.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = AppConfig::default();

        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| {
                eyre!("Failed to read config file at {}: {}", path.display(), e)
            })?;
            let user: AppConfig = toml::from_str(&content).map_err(|e| {
                eyre!("Failed to parse config file at {}: {}", path.display(), e)
            })?;
            config.merge(user);
        }

        config.validate()?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.ingest.merge(other.ingest);
        self.display.merge(other.display);
        self.filters.merge(other.filters);
        self.export.merge(other.export);
        self.site.merge(other.site);
        self.logging.merge(other.logging);
        self.theme.merge(other.theme);
        self.debug.merge(other.debug);
    }

    /// Command-line flags are the last layer.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(name) = &args.value_column {
            self.ingest.value_column = Some(name.clone());
        }
        if let Some(compression) = args.compression {
            self.ingest.compression = Some(compression.name().to_string());
        }
        if let Some(dir) = &args.output_dir {
            self.export.output_dir = dir.clone();
        }
        if args.debug {
            self.debug.enabled = true;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with(CONFIG_VERSION) {
            return Err(eyre!(
                "Unsupported config version: {}. Expected {}.x",
                self.version,
                CONFIG_VERSION
            ));
        }

        if let Some(name) = &self.ingest.compression {
            if CompressionFormat::from_name(name).is_none() {
                return Err(eyre!(
                    "Invalid compression: {}. Must be 'gzip', 'zstd', 'bzip2' or 'xz'",
                    name
                ));
            }
        }

        if self.display.chart_height < 5 {
            return Err(eyre!("chart_height must be at least 5"));
        }
        if self.display.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }
        if self.filters.slider_steps == 0 {
            return Err(eyre!("slider_steps must be greater than 0"));
        }

        if !(-90.0..=90.0).contains(&self.site.latitude) {
            return Err(eyre!("site latitude must be between -90 and 90"));
        }
        if !(-180.0..=180.0).contains(&self.site.longitude) {
            return Err(eyre!("site longitude must be between -180 and 180"));
        }
        if self.site.zoom > 20 {
            return Err(eyre!("site zoom must be between 0 and 20"));
        }

        if self.logging.enabled {
            tracing_subscriber::EnvFilter::try_new(&self.logging.level)
                .map_err(|e| eyre!("Invalid logging level '{}': {}", self.logging.level, e))?;
        }

        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;

        Ok(())
    }

    pub fn value_column(&self) -> ValueColumn {
        ValueColumn::from_option(self.ingest.value_column.clone())
    }

    /// Compression named in the config, if any. Validated on load.
    pub fn compression(&self) -> Option<CompressionFormat> {
        self.ingest
            .compression
            .as_deref()
            .and_then(CompressionFormat::from_name)
    }
}

impl IngestConfig {
    pub fn merge(&mut self, other: Self) {
        if other.value_column.is_some() {
            self.value_column = other.value_column;
        }
        if other.compression.is_some() {
            self.compression = other.compression;
        }
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DisplayConfig::default();
        merge_fields!(self, other, default; chart_height, show_raw_data, event_poll_interval_ms);
    }
}

impl FiltersConfig {
    pub fn merge(&mut self, other: Self) {
        let default = FiltersConfig::default();
        merge_fields!(self, other, default; slider_steps);
    }
}

impl ExportConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ExportConfig::default();
        merge_fields!(self, other, default; output_dir);
    }
}

impl SiteConfig {
    pub fn merge(&mut self, other: Self) {
        let default = SiteConfig::default();
        merge_fields!(
            self, other, default;
            place, latitude, longitude, altitude, zoom,
            sensor_type, measured_variable, frequency, context,
        );
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        let default = LoggingConfig::default();
        merge_fields!(self, other, default; enabled, level);
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        self.colors.merge(other.colors);
    }
}

impl ColorConfig {
    /// Theme key and configured value for every color.
    pub fn entries(&self) -> [(&'static str, &str); 14] {
        [
            ("primary", self.primary.as_str()),
            ("secondary", self.secondary.as_str()),
            ("success", self.success.as_str()),
            ("error", self.error.as_str()),
            ("warning", self.warning.as_str()),
            ("info", self.info.as_str()),
            ("dimmed", self.dimmed.as_str()),
            ("controls_bg", self.controls_bg.as_str()),
            ("text_primary", self.text_primary.as_str()),
            ("table_header", self.table_header.as_str()),
            ("table_border", self.table_border.as_str()),
            ("chart_line", self.chart_line.as_str()),
            ("threshold", self.threshold.as_str()),
            ("map_marker", self.map_marker.as_str()),
        ]
    }

    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.entries() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }
        Ok(())
    }

    pub fn merge(&mut self, other: Self) {
        let default = ColorConfig::default();
        merge_fields!(
            self, other, default;
            primary, secondary, success, error, warning, info, dimmed, controls_bg,
            text_primary, table_header, table_border, chart_line, threshold, map_marker,
        );
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DebugConfig::default();
        merge_fields!(self, other, default; enabled);
    }
}

/// Color parser with terminal capability detection
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    pub fn new() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok();
        let support = supports_color::on(Stream::Stdout);

        Self {
            supports_true_color: support.as_ref().map(|s| s.has_16m).unwrap_or(false),
            supports_256: support.as_ref().map(|s| s.has_256).unwrap_or(false),
            no_color,
        }
    }

    /// Parse `#rrggbb`, `indexed(n)` or a color name (case-insensitive).
    pub fn parse(&self, s: &str) -> Result<Color> {
        if self.no_color {
            return Ok(Color::Reset);
        }

        let trimmed = s.trim();

        if trimmed.starts_with('#') && trimmed.len() == 7 {
            let (r, g, b) = parse_hex(trimmed)?;
            return Ok(self.convert_rgb_to_terminal_color(r, g, b));
        }

        let lower = trimmed.to_lowercase();
        if let Some(inner) = lower
            .strip_prefix("indexed(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let num = inner.trim().parse::<u8>().map_err(|_| {
                eyre!(
                    "Invalid indexed color: '{}'. Expected format: indexed(0-255)",
                    trimmed
                )
            })?;
            return Ok(Color::Indexed(num));
        }

        match lower.replace(' ', "_").as_str() {
            "black" => Ok(Color::Black),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "magenta" => Ok(Color::Magenta),
            "cyan" => Ok(Color::Cyan),
            "white" => Ok(Color::White),
            "bright_black" | "gray" | "grey" | "dark_gray" | "dark_grey" => Ok(Color::Indexed(8)),
            "bright_red" => Ok(Color::Indexed(9)),
            "bright_green" => Ok(Color::Indexed(10)),
            "bright_yellow" => Ok(Color::Indexed(11)),
            "bright_blue" => Ok(Color::Indexed(12)),
            "bright_magenta" => Ok(Color::Indexed(13)),
            "bright_cyan" => Ok(Color::Indexed(14)),
            "bright_white" => Ok(Color::Indexed(15)),
            "light_gray" | "light_grey" => Ok(Color::Indexed(7)),
            "reset" => Ok(Color::Reset),
            _ => Err(eyre!(
                "Unknown color name: '{}'. Use a basic ANSI name (red, blue, ...), \
                 a bright variant (bright_red, ...), indexed(n) or #rrggbb",
                trimmed
            )),
        }
    }

    fn convert_rgb_to_terminal_color(&self, r: u8, g: u8, b: u8) -> Color {
        if self.supports_true_color {
            Color::Rgb(r, g, b)
        } else if self.supports_256 {
            Color::Indexed(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    let component = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(|| eyre!("Invalid hex color: '{}'. Expected format: #rrggbb", s))
    };
    Ok((component(1..3)?, component(3..5)?, component(5..7)?))
}

/// Nearest xterm 256-color palette index
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    let spread = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if spread < 10 {
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        return match gray {
            0..=7 => 16,
            248.. => 231,
            _ => 232 + ((gray - 8) * 24 / 240) as u8,
        };
    }

    let level = |c: u8| (c as u16 * 5 / 255) as u8;
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

/// Nearest of the 8 basic ANSI colors
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let spread = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if spread < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }

    match (r > 128, g > 128, b > 128) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::Red,
        (false, true, false) => Color::Green,
        (true, true, false) => Color::Yellow,
        (false, false, true) => Color::Blue,
        (true, false, true) => Color::Magenta,
        (false, true, true) => Color::Cyan,
        (true, true, true) => Color::White,
    }
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let colors = config
            .colors
            .entries()
            .into_iter()
            .map(|(name, value)| Ok((name.to_string(), parser.parse(value)?)))
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self { colors })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }

    pub fn get_optional(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default()).unwrap_or_else(|_| Self {
            colors: HashMap::new(),
        })
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");
