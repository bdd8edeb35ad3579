use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use tracing::{debug, info, warn};

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use ratatui::widgets::{Block, Borders, Paragraph, Tabs, Wrap};

pub mod analysis;
pub mod cache;
pub mod chart_data;
pub mod config;
pub mod error;
pub mod error_display;
pub mod export;
pub mod filter;
pub mod ingest;
pub mod logging;
pub mod site;
pub mod source;
pub mod statistics;
pub mod timestamp;
pub mod widgets;

pub use cache::CacheManager;
pub use config::{
    rgb_to_256_color, rgb_to_basic_ansi, AppConfig, ColorParser, ConfigManager, Theme, APP_NAME,
};
pub use sensordash_cli::{Args, CompressionFormat};

use analysis::Analysis;
use chart_data::{prepare_chart_data, ChartKind};
use error::AnalysisError;
use export::Download;
use filter::{FilterPanel, FilterSide, FilteredViews};
use site::SiteInfo;
use source::Upload;
use widgets::chart::SeriesChart;
use widgets::controls::Controls;
use widgets::datatable::DataTable;
use widgets::debug::DebugState;
use widgets::filters::{FilterColors, FiltersPanel, NoVariation};
use widgets::info::SiteInfoPanel;
use widgets::map::LocationMap;
use widgets::statistics::StatisticsPanel;
use widgets::text_input::{TextInput, TextInputEvent};

pub const NO_FILE_MESSAGE: &str = "Please load a CSV file to start the analysis.";
pub const ERROR_HINT: &str = "Make sure the CSV file has a valid column with data.";
pub const NO_VARIATION_HINT: &str = "Filters cannot be applied without variation in the data.";

const MAP_HEIGHT: u16 = 9;
/// Threshold steps taken by `[` and `]`.
const COARSE_STEPS: f64 = 10.0;

pub enum AppEvent {
    Key(KeyEvent),
    Open(PathBuf),
    DoLoad(Upload), // Internal event to actually load after the UI shows the loading notice
    Export,
    Exit,
    Crash(String),
    Resize(u16, u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

/// A status message with an optional follow-up hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub hint: Option<String>,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
            hint: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            hint: None,
        }
    }

    /// The single message for a failed evaluation pass.
    pub fn processing_error(message: &str) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: format!("An error occurred while processing the file: {}", message),
            hint: Some(ERROR_HINT.to_string()),
        }
    }

    pub fn no_variation(value: f64) -> Self {
        Self {
            kind: NoticeKind::Warning,
            message: format!("All values are equal: {:.2}", value),
            hint: Some(NO_VARIATION_HINT.to_string()),
        }
    }

    fn theme_key(&self) -> &'static str {
        match self.kind {
            NoticeKind::Info => "info",
            NoticeKind::Success => "success",
            NoticeKind::Warning => "warning",
            NoticeKind::Error => "error",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Visualization,
    Statistics,
    Filters,
    SiteInfo,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Visualization, Tab::Statistics, Tab::Filters, Tab::SiteInfo];

    pub fn title(self) -> &'static str {
        match self {
            Self::Visualization => "Visualization",
            Self::Statistics => "Statistics",
            Self::Filters => "Filters",
            Self::SiteInfo => "Site info",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Opening,
}

/// Scroll positions of the three tables.
#[derive(Debug, Default, Clone, Copy)]
struct Offsets {
    raw: usize,
    above: usize,
    below: usize,
}

pub struct App {
    events: Sender<AppEvent>,
    config: AppConfig,
    theme: Theme,
    site: SiteInfo,
    debug: DebugState,
    upload: Option<Upload>,
    analysis: Option<Analysis>,
    views: Option<FilteredViews>,
    notice: Option<Notice>,
    tab: Tab,
    chart_kind: ChartKind,
    show_raw_data: bool,
    filter_side: FilterSide,
    pub input_mode: InputMode,
    open_input: TextInput,
    offsets: Offsets,
    page_rows: usize,
}

impl App {
    pub fn send_event(&mut self, event: AppEvent) -> color_eyre::Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    pub fn new(events: Sender<AppEvent>) -> App {
        Self::new_with_config(events, Theme::default(), AppConfig::default())
    }

    pub fn new_with_config(events: Sender<AppEvent>, theme: Theme, config: AppConfig) -> App {
        let open_input = TextInput::new()
            .with_text_color(theme.get("text_primary"))
            .with_background(theme.get("controls_bg"));
        App {
            events,
            site: SiteInfo::from(&config.site),
            debug: DebugState {
                enabled: config.debug.enabled,
                ..DebugState::default()
            },
            show_raw_data: config.display.show_raw_data,
            config,
            theme,
            upload: None,
            analysis: None,
            views: None,
            notice: Some(Notice::info(NO_FILE_MESSAGE)),
            tab: Tab::default(),
            chart_kind: ChartKind::default(),
            filter_side: FilterSide::default(),
            input_mode: InputMode::Normal,
            open_input,
            offsets: Offsets::default(),
            page_rows: 10,
        }
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    fn color(&self, name: &str) -> Color {
        self.theme.get(name)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    pub fn views(&self) -> Option<&FilteredViews> {
        self.views.as_ref()
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn chart_kind(&self) -> ChartKind {
        self.chart_kind
    }

    pub fn show_raw_data(&self) -> bool {
        self.show_raw_data
    }

    pub fn filter_side(&self) -> FilterSide {
        self.filter_side
    }

    pub fn site(&self) -> &SiteInfo {
        &self.site
    }

    /// The warning shown in the Filters tab when every value is the same.
    pub fn filter_warning(&self) -> Option<Notice> {
        match self.analysis.as_ref().map(|a| &a.panel) {
            Some(FilterPanel::Disabled { value }) => Some(Notice::no_variation(*value)),
            _ => None,
        }
    }

    fn load(&mut self, upload: &Upload) -> Result<Analysis, AnalysisError> {
        let bytes = upload.read()?;
        Analysis::evaluate(
            &bytes,
            &self.config.value_column(),
            self.config.filters.slider_steps,
        )
    }

    /// Every failure of an upload ends here: the previous analysis is dropped.
    fn fail(&mut self, message: &str) {
        warn!(error = %message, "upload failed");
        self.analysis = None;
        self.views = None;
        self.notice = Some(Notice::processing_error(message));
    }

    /// Recompute both filter results from the held series.
    fn refresh_views(&mut self) {
        let Some(analysis) = &self.analysis else {
            self.views = None;
            return;
        };
        match analysis.views() {
            Ok(views) => self.views = views,
            Err(e) => {
                let message = error_display::user_message_from_polars(&e);
                self.fail(&message);
            }
        }
    }

    fn export(&mut self) {
        let Some(views) = &self.views else {
            return;
        };
        let result = Download::from_views(views)
            .map_err(|e| error_display::user_message_from_polars(&e))
            .and_then(|download| {
                download
                    .write_to(&self.config.export.output_dir)
                    .map_err(|e| error_display::user_message_from_io(&e, None))
            });
        self.notice = Some(match result {
            Ok(path) => Notice::success(format!("Filtered data exported to {}", path.display())),
            Err(message) => Notice {
                kind: NoticeKind::Error,
                message: format!("Could not export the filtered data: {}", message),
                hint: None,
            },
        });
    }

    fn move_threshold(&mut self, action: impl FnOnce(&mut FilterPanel, FilterSide)) {
        let side = self.filter_side;
        if let Some(analysis) = &mut self.analysis {
            if !analysis.panel.is_enabled() {
                return;
            }
            action(&mut analysis.panel, side);
            self.offsets.above = 0;
            self.offsets.below = 0;
            self.refresh_views();
        }
    }

    fn scroll(&mut self, delta: isize) {
        let (offset, rows) = match self.tab {
            Tab::Visualization => (
                &mut self.offsets.raw,
                self.analysis.as_ref().map(|a| a.series.len()),
            ),
            Tab::Filters => match (&self.views, self.filter_side) {
                (Some(v), FilterSide::Lower) => (&mut self.offsets.above, Some(v.above.len())),
                (Some(v), FilterSide::Upper) => (&mut self.offsets.below, Some(v.below.len())),
                (None, _) => (
                    &mut self.offsets.raw,
                    self.analysis.as_ref().map(|a| a.series.len()),
                ),
            },
            _ => return,
        };
        let max = rows.unwrap_or(0).saturating_sub(1);
        *offset = offset.saturating_add_signed(delta).min(max);
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        self.debug.on_key(event);

        if self.input_mode == InputMode::Opening {
            return match self.open_input.handle_key(event) {
                TextInputEvent::Submit => {
                    self.input_mode = InputMode::Normal;
                    let value = self.open_input.value();
                    let path = value.trim();
                    if path.is_empty() {
                        None
                    } else {
                        Some(AppEvent::Open(PathBuf::from(path)))
                    }
                }
                TextInputEvent::Cancel => {
                    self.open_input.clear();
                    self.input_mode = InputMode::Normal;
                    None
                }
                TextInputEvent::None => None,
            };
        }

        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppEvent::Exit);
        }

        match event.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Char('o') => {
                let current = self
                    .upload
                    .as_ref()
                    .map(|u| u.path.display().to_string())
                    .unwrap_or_default();
                self.open_input.set_value(&current);
                self.input_mode = InputMode::Opening;
                self.debug.last_action = "open_prompt".to_string();
                return None;
            }
            _ => {}
        }

        if self.analysis.is_none() {
            return None;
        }

        match event.code {
            KeyCode::Tab => {
                self.tab = self.tab.next();
                self.debug.last_action = "next_tab".to_string();
            }
            KeyCode::BackTab => {
                self.tab = self.tab.prev();
                self.debug.last_action = "prev_tab".to_string();
            }
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                self.tab = Tab::ALL[index];
            }
            KeyCode::Char('j') | KeyCode::Down if self.tab != Tab::Filters => self.scroll(1),
            KeyCode::Char('k') | KeyCode::Up if self.tab != Tab::Filters => self.scroll(-1),
            KeyCode::Char('j') => self.scroll(1),
            KeyCode::Char('k') => self.scroll(-1),
            KeyCode::PageDown => self.scroll(self.page_rows as isize),
            KeyCode::PageUp => self.scroll(-(self.page_rows as isize)),
            _ => match self.tab {
                Tab::Visualization => self.visualization_key(event),
                Tab::Filters => return self.filters_key(event),
                Tab::Statistics | Tab::SiteInfo => {}
            },
        }
        None
    }

    fn visualization_key(&mut self, event: &KeyEvent) {
        match event.code {
            KeyCode::Char('c') => {
                self.chart_kind = self.chart_kind.next();
                self.debug.last_action = format!("chart_{}", self.chart_kind.as_str());
            }
            KeyCode::Char('r') => {
                self.show_raw_data = !self.show_raw_data;
                self.offsets.raw = 0;
            }
            _ => {}
        }
    }

    fn filters_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        match event.code {
            KeyCode::Up | KeyCode::Down => self.filter_side = self.filter_side.toggle(),
            KeyCode::Left | KeyCode::Char('h') => self.move_threshold(|p, s| p.step(s, -1.0)),
            KeyCode::Right | KeyCode::Char('l') => self.move_threshold(|p, s| p.step(s, 1.0)),
            KeyCode::Char('[') => self.move_threshold(|p, s| p.step(s, -COARSE_STEPS)),
            KeyCode::Char(']') => self.move_threshold(|p, s| p.step(s, COARSE_STEPS)),
            KeyCode::Home => self.move_threshold(|p, s| p.to_min(s)),
            KeyCode::End => self.move_threshold(|p, s| p.to_max(s)),
            KeyCode::Char('m') => self.move_threshold(|p, _| p.reset()),
            KeyCode::Char('e') if self.views.is_some() => return Some(AppEvent::Export),
            _ => {}
        }
        if let Some(t) = self.analysis.as_ref().and_then(|a| a.panel.thresholds()) {
            debug!(low = t.low, high = t.high, side = ?self.filter_side, "filter state");
        }
        None
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) if key.kind != KeyEventKind::Release => self.key(key),
            AppEvent::Key(_) => None,
            AppEvent::Open(path) => {
                let upload = Upload::new(path.clone(), self.config.compression());
                self.notice = Some(Notice::info(format!("Loading {}...", upload.display_name())));
                // Return DoLoad so the loading notice renders before the blocking read.
                Some(AppEvent::DoLoad(upload))
            }
            AppEvent::DoLoad(upload) => {
                self.debug.num_evaluations += 1;
                self.upload = Some(upload.clone());
                self.offsets = Offsets::default();
                match self.load(upload) {
                    Ok(analysis) => {
                        info!(file = %upload.display_name(), "upload loaded");
                        self.analysis = Some(analysis);
                        self.notice = None;
                        self.refresh_views();
                    }
                    Err(e) => self.fail(&error_display::user_message(&e)),
                }
                None
            }
            AppEvent::Export => {
                self.export();
                None
            }
            AppEvent::Resize(_cols, rows) => {
                self.page_rows = (*rows as usize / 3).max(1);
                None
            }
            AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }

    fn hints(&self) -> Vec<(&'static str, &'static str)> {
        if self.input_mode == InputMode::Opening {
            return vec![("Enter", "Load"), ("Esc", "Cancel")];
        }
        let mut hints = vec![("o", "Open")];
        if self.analysis.is_some() {
            hints.push(("Tab", "Next tab"));
            match self.tab {
                Tab::Visualization => {
                    hints.push(("c", "Chart type"));
                    hints.push(("r", "Raw data"));
                    if self.show_raw_data {
                        hints.push(("j/k", "Scroll"));
                    }
                }
                Tab::Filters if self.views.is_some() => {
                    hints.push(("↑↓", "Select"));
                    hints.push(("←→", "Adjust"));
                    hints.push(("Home/End", "Min/Max"));
                    hints.push(("m", "Mean"));
                    hints.push(("e", "Export"));
                }
                Tab::Filters => hints.push(("j/k", "Scroll")),
                Tab::Statistics | Tab::SiteInfo => {}
            }
        }
        hints.push(("q", "Quit"));
        hints
    }

    fn status(&self) -> Option<String> {
        match (&self.upload, &self.analysis) {
            (Some(upload), Some(a)) => Some(format!("{}  Rows: {}", upload.display_name(), a.series.len())),
            (Some(upload), None) => Some(upload.display_name()),
            _ => None,
        }
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let [title, welcome] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Fill(1)])
            .areas(area);
        Paragraph::new(Line::from(Span::styled(
            site::TITLE,
            Style::default()
                .fg(self.color("secondary"))
                .add_modifier(Modifier::BOLD),
        )))
        .render(title, buf);
        Paragraph::new(site::WELCOME)
            .wrap(Wrap { trim: true })
            .render(welcome, buf);
    }

    fn render_upload(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.color("table_border")))
            .title(" Load CSV file ");
        let inner = block.inner(area);
        block.render(area, buf);
        if self.input_mode == InputMode::Opening {
            (&self.open_input).render(inner, buf);
        } else {
            let text = match &self.upload {
                Some(upload) => upload.path.display().to_string(),
                None => "No file selected. Press o to choose one.".to_string(),
            };
            Paragraph::new(text)
                .style(Style::default().fg(self.color("dimmed")))
                .render(inner, buf);
        }
    }

    fn render_notice(&self, notice: &Notice, area: Rect, buf: &mut Buffer) {
        let mut lines = vec![Line::from(Span::styled(
            notice.message.clone(),
            Style::default()
                .fg(self.color(notice.theme_key()))
                .add_modifier(Modifier::BOLD),
        ))];
        if let Some(hint) = &notice.hint {
            lines.push(Line::from(Span::styled(
                hint.clone(),
                Style::default().fg(self.color("info")),
            )));
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }

    fn render_tabs(&self, analysis: &Analysis, area: Rect, buf: &mut Buffer) {
        let [tabs_area, content] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Fill(1)])
            .areas(area);

        Tabs::new(Tab::ALL.iter().map(|t| t.title()))
            .select(self.tab.index())
            .style(Style::default().fg(self.color("dimmed")))
            .highlight_style(
                Style::default()
                    .fg(self.color("text_primary"))
                    .bg(self.color("secondary"))
                    .add_modifier(Modifier::BOLD),
            )
            .render(tabs_area, buf);

        let border = self.color("table_border");
        let header = self.color("table_header");
        match self.tab {
            Tab::Visualization => self.render_visualization(analysis, content, buf),
            Tab::Statistics => StatisticsPanel::new(&analysis.summary)
                .colors(self.color("secondary"), border)
                .render(content, buf),
            Tab::Filters => {
                let colors = FilterColors {
                    header,
                    border,
                    slider: self.color("threshold"),
                    warning: self.color("warning"),
                    info: self.color("info"),
                };
                match (&analysis.panel, &self.views) {
                    (FilterPanel::Enabled { lower, upper, .. }, Some(views)) => FiltersPanel {
                        lower,
                        upper,
                        views,
                        selected: self.filter_side,
                        offsets: (self.offsets.above, self.offsets.below),
                        colors,
                    }
                    .render(content, buf),
                    (FilterPanel::Disabled { value }, _) => NoVariation {
                        value: *value,
                        series: &analysis.series,
                        offset: self.offsets.raw,
                        colors,
                    }
                    .render(content, buf),
                    (FilterPanel::Enabled { .. }, None) => {}
                }
            }
            Tab::SiteInfo => SiteInfoPanel::new(&self.site)
                .colors(self.color("secondary"), border)
                .render(content, buf),
        }
    }

    fn render_visualization(&self, analysis: &Analysis, area: Rect, buf: &mut Buffer) {
        let chart_height = self.config.display.chart_height;
        let [chart_area, raw_area] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(chart_height), Constraint::Fill(1)])
            .areas(area);

        match prepare_chart_data(&analysis.series) {
            Ok(data) => SeriesChart::new(&data, self.chart_kind)
                .colors(
                    self.color("chart_line"),
                    self.color("text_primary"),
                    self.color("table_border"),
                )
                .render(chart_area, buf),
            Err(e) => Paragraph::new(error_display::user_message_from_polars(&e))
                .style(Style::default().fg(self.color("error")))
                .render(chart_area, buf),
        }

        if self.show_raw_data {
            DataTable::new(analysis.series.frame())
                .title("Raw data")
                .colors(self.color("table_header"), self.color("table_border"))
                .offset(self.offsets.raw)
                .render(raw_area, buf);
        }
    }

    fn render_footer(&self, area: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(self.color("dimmed"));
        Paragraph::new(vec![
            Line::from(Span::styled(site::FOOTER[0], style.add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(site::FOOTER[1], style.add_modifier(Modifier::ITALIC))),
        ])
        .centered()
        .render(area, buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        let notice_height = match &self.notice {
            Some(n) if n.hint.is_some() => 2,
            Some(_) => 1,
            None => 0,
        };

        let mut constraints = vec![
            Constraint::Length(3), // title + welcome
            Constraint::Length(MAP_HEIGHT),
            Constraint::Length(3), // upload prompt
            Constraint::Length(notice_height),
            Constraint::Fill(1),
            Constraint::Length(2), // footer
            Constraint::Length(1), // controls
        ];
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        self.render_header(layout[0], buf);
        LocationMap::new(&self.site)
            .colors(self.color("map_marker"), self.color("table_border"))
            .render(layout[1], buf);
        self.render_upload(layout[2], buf);
        if let Some(notice) = &self.notice {
            self.render_notice(notice, layout[3], buf);
        }
        if let Some(analysis) = &self.analysis {
            self.render_tabs(analysis, layout[4], buf);
        }
        self.render_footer(layout[5], buf);

        let controls = Controls::new(self.hints())
            .with_status(self.status())
            .with_bg(self.color("controls_bg"))
            .with_dimmed(self.input_mode == InputMode::Opening);
        (&controls).render(layout[6], buf);

        if self.debug.enabled {
            (&self.debug).render(layout[7], buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_wrap_around() {
        assert_eq!(Tab::SiteInfo.next(), Tab::Visualization);
        assert_eq!(Tab::Visualization.prev(), Tab::SiteInfo);
        assert_eq!(Tab::Filters.index(), 2);
    }

    #[test]
    fn processing_error_notice_has_hint() {
        let notice = Notice::processing_error("bad");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(
            notice.message,
            "An error occurred while processing the file: bad"
        );
        assert_eq!(notice.hint.as_deref(), Some(ERROR_HINT));
    }

    #[test]
    fn no_variation_notice_uses_two_decimals() {
        let notice = Notice::no_variation(5.0);
        assert_eq!(notice.kind, NoticeKind::Warning);
        assert_eq!(notice.message, "All values are equal: 5.00");
    }
}
