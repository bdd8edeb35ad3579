use sensordash::export::{encode_csv, Download, DOWNLOAD_FILE_NAME, DOWNLOAD_MIME};
use sensordash::filter::{filter, Thresholds};
use sensordash::ingest::normalize;

mod common;

#[test]
fn test_export_holds_lower_bound_rows() {
    let series = normalize(common::SENSOR_CSV.as_bytes()).unwrap();
    let views = filter(&series, Thresholds { low: 20.0, high: 25.0 }).unwrap();
    let download = Download::from_views(&views).unwrap();

    assert_eq!(download.file_name, DOWNLOAD_FILE_NAME);
    assert_eq!(download.mime, DOWNLOAD_MIME);

    let text = String::from_utf8(download.bytes.clone()).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Time,variable"));
    let row = lines.next().unwrap();
    assert!(row.starts_with("2024-01-01"));
    assert!(row.ends_with(",25"));
    assert_eq!(lines.next(), None);
}

#[test]
fn test_exported_csv_loads_again() {
    let series = normalize(common::SENSOR_CSV.as_bytes()).unwrap();
    let views = filter(&series, Thresholds { low: 19.0, high: 25.0 }).unwrap();
    let bytes = encode_csv(views.above.frame()).unwrap();

    let reloaded = normalize(&bytes).unwrap();
    assert!(reloaded.has_time());
    assert_eq!(reloaded.len(), 3);
    assert_eq!(
        reloaded.time_millis().unwrap(),
        series.time_millis().unwrap()
    );
}

#[test]
fn test_export_without_time_has_no_index() {
    let series = normalize(b"temp\n1\n5\n").unwrap();
    let views = filter(&series, Thresholds { low: 2.0, high: 2.0 }).unwrap();
    let download = Download::from_views(&views).unwrap();
    assert_eq!(String::from_utf8(download.bytes).unwrap(), "variable\n5\n");
}

#[test]
fn test_write_to_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let series = normalize(common::SENSOR_CSV.as_bytes()).unwrap();
    let views = filter(&series, Thresholds { low: 20.0, high: 25.0 }).unwrap();
    let target = dir.path().join("exports");

    let path = Download::from_views(&views).unwrap().write_to(&target).unwrap();
    assert_eq!(path, target.join(DOWNLOAD_FILE_NAME));
    assert!(std::fs::read_to_string(path).unwrap().contains(",25"));
}
