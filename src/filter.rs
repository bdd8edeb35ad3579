//! Threshold filters over the measured variable.
//!
//! Two independent filters share the same range: the lower-bound filter keeps rows strictly
//! above its threshold, the upper-bound filter keeps rows strictly below its own. They are
//! never combined into a band.

use polars::prelude::*;

use crate::ingest::TimeSeries;
use crate::statistics::Summary;

/// A threshold value confined to `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    value: f64,
    min: f64,
    max: f64,
}

impl Threshold {
    pub fn new(value: f64, min: f64, max: f64) -> Self {
        Self {
            value: clamp(value, min, max),
            min,
            max,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    pub fn set(&mut self, value: f64) {
        self.value = clamp(value, self.min, self.max);
    }

    /// Move by `delta`, staying inside the bounds.
    pub fn nudge(&mut self, delta: f64) {
        self.set(self.value + delta);
    }

    /// Position inside the range as a ratio in `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        if self.max > self.min {
            (self.value - self.min) / (self.max - self.min)
        } else {
            0.0
        }
    }
}

fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.max(min).min(max)
    }
}

/// Current values of both filter thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub low: f64,
    pub high: f64,
}

/// Which of the two thresholds a control acts on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FilterSide {
    #[default]
    Lower,
    Upper,
}

impl FilterSide {
    pub fn toggle(self) -> Self {
        match self {
            Self::Lower => Self::Upper,
            Self::Upper => Self::Lower,
        }
    }
}

/// Filter controls derived from a summary.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPanel {
    /// Every value is the same; filtering is not offered.
    Disabled { value: f64 },
    Enabled {
        lower: Threshold,
        upper: Threshold,
        mean: f64,
        /// Threshold step for one key press.
        step: f64,
    },
}

impl FilterPanel {
    /// Both thresholds start at the mean. `steps` is the number of key presses across the range.
    pub fn new(summary: &Summary, steps: usize) -> Self {
        if summary.is_constant() {
            return Self::Disabled { value: summary.min };
        }
        let (min, max) = (summary.min, summary.max);
        Self::Enabled {
            lower: Threshold::new(summary.mean, min, max),
            upper: Threshold::new(summary.mean, min, max),
            mean: summary.mean,
            step: (max - min) / steps.max(1) as f64,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled { .. })
    }

    pub fn thresholds(&self) -> Option<Thresholds> {
        match self {
            Self::Disabled { .. } => None,
            Self::Enabled { lower, upper, .. } => Some(Thresholds {
                low: lower.value(),
                high: upper.value(),
            }),
        }
    }

    pub fn threshold_mut(&mut self, side: FilterSide) -> Option<&mut Threshold> {
        match self {
            Self::Disabled { .. } => None,
            Self::Enabled { lower, upper, .. } => Some(match side {
                FilterSide::Lower => lower,
                FilterSide::Upper => upper,
            }),
        }
    }

    /// Move one threshold by a number of steps (negative moves down).
    pub fn step(&mut self, side: FilterSide, steps: f64) {
        let step = match self {
            Self::Enabled { step, .. } => *step,
            Self::Disabled { .. } => return,
        };
        if let Some(t) = self.threshold_mut(side) {
            t.nudge(step * steps);
        }
    }

    pub fn to_min(&mut self, side: FilterSide) {
        if let Some(t) = self.threshold_mut(side) {
            let (min, _) = t.bounds();
            t.set(min);
        }
    }

    pub fn to_max(&mut self, side: FilterSide) {
        if let Some(t) = self.threshold_mut(side) {
            let (_, max) = t.bounds();
            t.set(max);
        }
    }

    /// Put both thresholds back on the mean.
    pub fn reset(&mut self) {
        if let Self::Enabled {
            lower, upper, mean, ..
        } = self
        {
            lower.set(*mean);
            upper.set(*mean);
        }
    }
}

/// The two independent filter results.
#[derive(Debug, Clone)]
pub struct FilteredViews {
    /// Rows with `variable > low`.
    pub above: TimeSeries,
    /// Rows with `variable < high`.
    pub below: TimeSeries,
}

/// Apply both thresholds. Null values never pass.
pub fn filter(series: &TimeSeries, thresholds: Thresholds) -> PolarsResult<FilteredViews> {
    Ok(FilteredViews {
        above: filter_above(series, thresholds.low)?,
        below: filter_below(series, thresholds.high)?,
    })
}

pub fn filter_above(series: &TimeSeries, threshold: f64) -> PolarsResult<TimeSeries> {
    let values = variable_f64(series)?;
    series.retain(&values.f64()?.gt(threshold))
}

pub fn filter_below(series: &TimeSeries, threshold: f64) -> PolarsResult<TimeSeries> {
    let values = variable_f64(series)?;
    series.retain(&values.f64()?.lt(threshold))
}

fn variable_f64(series: &TimeSeries) -> PolarsResult<Column> {
    series.variable()?.cast(&DataType::Float64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(min: f64, max: f64, mean: f64) -> Summary {
        Summary {
            count: 3,
            mean,
            std: 1.0,
            min,
            q25: min,
            median: mean,
            q75: max,
            max,
        }
    }

    #[test]
    fn threshold_is_clamped() {
        let mut t = Threshold::new(100.0, 0.0, 10.0);
        assert_eq!(t.value(), 10.0);
        t.set(-5.0);
        assert_eq!(t.value(), 0.0);
        t.nudge(2.5);
        assert_eq!(t.value(), 2.5);
        assert_eq!(t.ratio(), 0.25);
    }

    #[test]
    fn nan_threshold_falls_to_min() {
        let t = Threshold::new(f64::NAN, 1.0, 2.0);
        assert_eq!(t.value(), 1.0);
    }

    #[test]
    fn constant_summary_disables_panel() {
        let panel = FilterPanel::new(&summary(5.0, 5.0, 5.0), 100);
        assert_eq!(panel, FilterPanel::Disabled { value: 5.0 });
        assert!(panel.thresholds().is_none());
    }

    #[test]
    fn thresholds_start_at_mean() {
        let panel = FilterPanel::new(&summary(0.0, 10.0, 4.0), 100);
        assert_eq!(
            panel.thresholds(),
            Some(Thresholds {
                low: 4.0,
                high: 4.0
            })
        );
    }

    #[test]
    fn stepping_moves_one_side_only() {
        let mut panel = FilterPanel::new(&summary(0.0, 10.0, 4.0), 10);
        panel.step(FilterSide::Lower, 1.0);
        panel.step(FilterSide::Upper, -2.0);
        let t = panel.thresholds().unwrap();
        assert_eq!(t.low, 5.0);
        assert_eq!(t.high, 2.0);

        panel.to_max(FilterSide::Lower);
        panel.to_min(FilterSide::Upper);
        let t = panel.thresholds().unwrap();
        assert_eq!((t.low, t.high), (10.0, 0.0));

        panel.reset();
        let t = panel.thresholds().unwrap();
        assert_eq!((t.low, t.high), (4.0, 4.0));
    }

    #[test]
    fn side_toggles() {
        assert_eq!(FilterSide::Lower.toggle(), FilterSide::Upper);
        assert_eq!(FilterSide::Upper.toggle(), FilterSide::Lower);
    }
}
