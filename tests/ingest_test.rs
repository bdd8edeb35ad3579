use polars::prelude::*;
use sensordash::error::IngestError;
use sensordash::ingest::{normalize, normalize_with, ValueColumn, TIME_COLUMN, VARIABLE_COLUMN};

mod common;

#[test]
fn test_time_column_becomes_index() {
    let series = normalize(common::SENSOR_CSV.as_bytes()).unwrap();
    assert!(series.has_time());
    assert_eq!(series.source_column(), "sensorA");
    assert_eq!(series.len(), 3);

    let names: Vec<String> = series
        .frame()
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(names, vec![TIME_COLUMN, VARIABLE_COLUMN]);
    assert_eq!(
        series.frame().column(TIME_COLUMN).unwrap().dtype(),
        &DataType::Datetime(TimeUnit::Milliseconds, None)
    );

    let millis = series.time_millis().unwrap().unwrap();
    assert_eq!(millis[0], Some(1_704_067_200_000));
    assert_eq!(millis[1], Some(1_704_070_800_000));
}

#[test]
fn test_first_column_without_time() {
    let series = normalize(b"temp,humidity\n1.5,40\n2.5,41\n").unwrap();
    assert!(!series.has_time());
    assert_eq!(series.source_column(), "temp");
    assert!(series.time_millis().unwrap().is_none());

    let values: Vec<Option<f64>> = series
        .variable()
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(values, vec![Some(1.5), Some(2.5)]);
    assert!(series.frame().column("humidity").is_ok());
}

#[test]
fn test_time_need_not_be_first() {
    let series = normalize(b"no2,Time\n7,2024-01-01 00:00:00\n").unwrap();
    assert!(series.has_time());
    assert_eq!(series.source_column(), "no2");
}

#[test]
fn test_named_value_column() {
    let csv = b"Time,a,b\n2024-01-01 00:00:00,1,10\n";
    let series = normalize_with(csv, &ValueColumn::Named("b".to_string())).unwrap();
    assert_eq!(series.source_column(), "b");

    let err = normalize_with(csv, &ValueColumn::Named("c".to_string())).unwrap_err();
    assert!(matches!(err, IngestError::MissingColumn(name) if name == "c"));
}

#[test]
fn test_only_time_column() {
    let err = normalize(b"Time\n2024-01-01 00:00:00\n").unwrap_err();
    assert!(matches!(err, IngestError::NoValueColumn(_)));
}

#[test]
fn test_bad_timestamp_reports_row() {
    let err = normalize(b"Time,v\n2024-01-01 00:00:00,1\nyesterday,2\n").unwrap_err();
    match err {
        IngestError::InvalidTimestamp { row, value } => {
            assert_eq!(row, 2);
            assert_eq!(value, "yesterday");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_empty_and_malformed_uploads() {
    assert!(matches!(normalize(b"").unwrap_err(), IngestError::Empty));
    assert!(matches!(normalize(b"  \n").unwrap_err(), IngestError::Empty));
    assert!(matches!(
        normalize(b"a,b\n\"1,2\n").unwrap_err(),
        IngestError::Malformed(_)
    ));
}

#[test]
fn test_readings_written_by_polars() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_readings_csv(dir.path(), 48);
    let bytes = std::fs::read(path).unwrap();
    let series = normalize(&bytes).unwrap();
    assert_eq!(series.len(), 48);
    assert_eq!(series.source_column(), "pm25");
    assert_eq!(series.frame().width(), 3);
}

#[test]
fn test_late_decimal_after_many_integers() {
    let mut csv = String::from("Time,temp\n");
    for i in 0..150 {
        csv.push_str(&format!("2024-01-01T{:02}:{:02},20\n", i / 60, i % 60));
    }
    csv.push_str("2024-01-02T00:00,20.5\n");
    let series = normalize(csv.as_bytes()).unwrap();
    assert_eq!(series.len(), 151);
    let last = series.variable().unwrap().f64().unwrap().get(150);
    assert_eq!(last, Some(20.5));
}

#[test]
fn test_inch_mark_in_unquoted_field() {
    let series = normalize(b"sensorA,note\n1,5\" pipe\n2,ok\n").unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series.source_column(), "sensorA");
}
