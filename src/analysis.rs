//! One evaluation pass over an upload.

use polars::prelude::PolarsResult;
use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::filter::{filter, FilterPanel, FilteredViews};
use crate::ingest::{normalize_with, TimeSeries, ValueColumn};
use crate::statistics::{describe, Summary};

/// Everything derived from a successfully evaluated upload.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub series: TimeSeries,
    pub summary: Summary,
    pub panel: FilterPanel,
}

impl Analysis {
    pub fn evaluate(
        bytes: &[u8],
        selection: &ValueColumn,
        slider_steps: usize,
    ) -> Result<Self, AnalysisError> {
        let series = normalize_with(bytes, selection)?;
        let summary = describe(&series)?;
        let panel = FilterPanel::new(&summary, slider_steps);
        info!(
            rows = series.len(),
            mean = summary.mean,
            min = summary.min,
            max = summary.max,
            filters_enabled = panel.is_enabled(),
            "evaluated upload"
        );
        Ok(Self {
            series,
            summary,
            panel,
        })
    }

    /// Current filter results, or `None` when every value is the same.
    pub fn views(&self) -> PolarsResult<Option<FilteredViews>> {
        match self.panel.thresholds() {
            Some(t) => {
                debug!(low = t.low, high = t.high, "applying filters");
                filter(&self.series, t).map(Some)
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IngestError, StatsError};

    #[test]
    fn constant_upload_disables_filters() {
        let a = Analysis::evaluate(b"sensorA\n5\n5\n5\n", &ValueColumn::Positional, 100).unwrap();
        assert!(!a.panel.is_enabled());
        assert!(a.views().unwrap().is_none());
        assert_eq!(a.series.len(), 3);
    }

    #[test]
    fn header_only_has_no_values() {
        let err = Analysis::evaluate(b"Time,v\n", &ValueColumn::Positional, 100).unwrap_err();
        assert!(matches!(err, AnalysisError::Stats(StatsError::NoValues(_))));
    }

    #[test]
    fn malformed_upload_is_ingest_error() {
        let err = Analysis::evaluate(b"a\n\"1\n", &ValueColumn::Positional, 100).unwrap_err();
        assert!(matches!(err, AnalysisError::Ingest(IngestError::Malformed(_))));
    }
}
