//! Plot points for the measured variable, in upload row order.

use polars::prelude::*;

use crate::ingest::TimeSeries;

/// How x-axis values map back to labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XAxisKind {
    /// x = row position.
    RowIndex,
    /// x = milliseconds since the Unix epoch.
    DatetimeMs,
}

/// Chart type offered by the visualization tab.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChartKind {
    #[default]
    Line,
    Area,
    Bar,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Line, ChartKind::Area, ChartKind::Bar];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "Line",
            Self::Area => "Area",
            Self::Bar => "Bar",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Line => Self::Area,
            Self::Area => Self::Bar,
            Self::Bar => Self::Line,
        }
    }
}

/// Points plus axis bounds, ready for a ratatui chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub points: Vec<(f64, f64)>,
    pub x_axis_kind: XAxisKind,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// No aggregation or resampling. Rows with a missing or non-finite value are skipped.
pub fn prepare_chart_data(series: &TimeSeries) -> PolarsResult<ChartData> {
    let y = series.variable()?.cast(&DataType::Float64)?;
    let y = y.f64()?;
    let times = series.time_millis()?;

    let x_axis_kind = if times.is_some() {
        XAxisKind::DatetimeMs
    } else {
        XAxisKind::RowIndex
    };

    let mut points = Vec::with_capacity(y.len());
    for (i, y_val) in y.iter().enumerate() {
        let x_val = match &times {
            Some(t) => t.get(i).copied().flatten().map(|ms| ms as f64),
            None => Some(i as f64),
        };
        if let (Some(x), Some(y)) = (x_val, y_val) {
            if x.is_finite() && y.is_finite() {
                points.push((x, y));
            }
        }
    }

    Ok(ChartData {
        x_bounds: bounds(points.iter().map(|p| p.0)),
        y_bounds: bounds(points.iter().map(|p| p.1)),
        points,
        x_axis_kind,
    })
}

/// Min/max of the values, widened when they coincide so the axis has a span.
fn bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if lo == hi {
        let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.05 };
        return [lo - pad, hi + pad];
    }
    [lo, hi]
}

/// Label for an x value, formatted for its axis kind.
pub fn format_x_label(x: f64, kind: XAxisKind) -> String {
    match kind {
        XAxisKind::RowIndex => format!("{}", x.round() as i64),
        XAxisKind::DatetimeMs => chrono::DateTime::from_timestamp_millis(x as i64)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| format!("{}", x)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::normalize;

    #[test]
    fn without_time_x_is_row_position() {
        let ts = normalize(b"v\n3\n1\n2\n").unwrap();
        let data = prepare_chart_data(&ts).unwrap();
        assert_eq!(data.x_axis_kind, XAxisKind::RowIndex);
        assert_eq!(data.points, vec![(0.0, 3.0), (1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(data.y_bounds, [1.0, 3.0]);
    }

    #[test]
    fn time_axis_keeps_upload_order() {
        let ts = normalize(b"Time,v\n1970-01-01T00:00:02,1\n1970-01-01T00:00:01,2\n").unwrap();
        let data = prepare_chart_data(&ts).unwrap();
        assert_eq!(data.x_axis_kind, XAxisKind::DatetimeMs);
        assert_eq!(data.points, vec![(2000.0, 1.0), (1000.0, 2.0)]);
    }

    #[test]
    fn missing_values_are_skipped() {
        let ts = normalize(b"v,w\n1,a\n,b\n3,c\n").unwrap();
        let data = prepare_chart_data(&ts).unwrap();
        assert_eq!(data.points, vec![(0.0, 1.0), (2.0, 3.0)]);
    }

    #[test]
    fn flat_series_gets_padded_bounds() {
        let ts = normalize(b"v\n5\n5\n").unwrap();
        let data = prepare_chart_data(&ts).unwrap();
        assert!(data.y_bounds[0] < 5.0 && data.y_bounds[1] > 5.0);
    }

    #[test]
    fn chart_kind_cycles() {
        assert_eq!(ChartKind::default(), ChartKind::Line);
        assert_eq!(ChartKind::Line.next(), ChartKind::Area);
        assert_eq!(ChartKind::Bar.next(), ChartKind::Line);
    }

    #[test]
    fn datetime_label() {
        assert_eq!(format_x_label(0.0, XAxisKind::DatetimeMs), "1970-01-01 00:00");
        assert_eq!(format_x_label(4.0, XAxisKind::RowIndex), "4");
    }
}
