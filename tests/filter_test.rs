use sensordash::analysis::Analysis;
use sensordash::filter::{filter, FilterPanel, FilterSide, Thresholds};
use sensordash::ingest::{normalize, ValueColumn};

mod common;

fn values(series: &sensordash::ingest::TimeSeries) -> Vec<Option<f64>> {
    series
        .variable()
        .unwrap()
        .cast(&polars::prelude::DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

#[test]
fn test_threshold_at_twenty_keeps_peak() {
    let series = normalize(common::SENSOR_CSV.as_bytes()).unwrap();
    let views = filter(
        &series,
        Thresholds {
            low: 20.0,
            high: 25.0,
        },
    )
    .unwrap();

    assert_eq!(values(&views.above), vec![Some(25.0)]);
    assert_eq!(values(&views.below), vec![Some(20.0), Some(20.0)]);
    // Timestamps travel with their rows.
    let millis = views.above.time_millis().unwrap().unwrap();
    assert_eq!(millis, vec![Some(1_704_070_800_000)]);
}

#[test]
fn test_filters_are_independent() {
    let series = normalize(b"v\n1\n2\n3\n4\n5\n").unwrap();
    // Low above high does not produce an empty band: each side applies alone.
    let views = filter(&series, Thresholds { low: 4.0, high: 2.0 }).unwrap();
    assert_eq!(values(&views.above), vec![Some(5.0)]);
    assert_eq!(values(&views.below), vec![Some(1.0)]);
}

#[test]
fn test_extreme_thresholds_are_empty() {
    let series = normalize(b"v\n1\n2\n3\n").unwrap();
    let views = filter(&series, Thresholds { low: 3.0, high: 1.0 }).unwrap();
    assert!(views.above.is_empty());
    assert!(views.below.is_empty());
}

#[test]
fn test_nulls_never_pass() {
    let series = normalize(b"v,w\n1,a\n,b\n3,c\n").unwrap();
    let views = filter(&series, Thresholds { low: 0.0, high: 10.0 }).unwrap();
    assert_eq!(views.above.len(), 2);
    assert_eq!(views.below.len(), 2);
}

#[test]
fn test_panel_starts_at_mean() {
    let analysis =
        Analysis::evaluate(common::SENSOR_CSV.as_bytes(), &ValueColumn::Positional, 100).unwrap();
    let thresholds = analysis.panel.thresholds().unwrap();
    assert!((thresholds.low - 65.0 / 3.0).abs() < 1e-9);
    assert!((thresholds.high - 65.0 / 3.0).abs() < 1e-9);

    let views = analysis.views().unwrap().unwrap();
    assert_eq!(values(&views.above), vec![Some(25.0)]);
    assert_eq!(values(&views.below), vec![Some(20.0), Some(20.0)]);
}

#[test]
fn test_panel_steps_stay_in_range() {
    let analysis =
        Analysis::evaluate(common::SENSOR_CSV.as_bytes(), &ValueColumn::Positional, 10).unwrap();
    let mut panel = analysis.panel;

    panel.to_min(FilterSide::Lower);
    panel.step(FilterSide::Lower, -3.0);
    assert_eq!(panel.thresholds().unwrap().low, 20.0);

    panel.step(FilterSide::Lower, 2.0);
    assert!((panel.thresholds().unwrap().low - 21.0).abs() < 1e-9);

    panel.to_max(FilterSide::Upper);
    panel.step(FilterSide::Upper, 5.0);
    assert_eq!(panel.thresholds().unwrap().high, 25.0);

    panel.reset();
    let t = panel.thresholds().unwrap();
    assert_eq!(t.low, t.high);
}

#[test]
fn test_constant_values_disable_filters() {
    let analysis =
        Analysis::evaluate(b"Time,sensorA\n2024-01-01 00:00:00,5\n2024-01-01 01:00:00,5\n", &ValueColumn::Positional, 100)
            .unwrap();
    assert_eq!(analysis.panel, FilterPanel::Disabled { value: 5.0 });
    assert!(analysis.panel.thresholds().is_none());
    assert!(analysis.views().unwrap().is_none());
}
