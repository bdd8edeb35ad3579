#![allow(dead_code)]

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use polars::prelude::*;
use sensordash::{App, AppEvent};
use std::fs::File;
use std::path::{Path, PathBuf};

pub const SENSOR_CSV: &str = "Time,sensorA\n\
2024-01-01 00:00:00,20\n\
2024-01-01 01:00:00,25\n\
2024-01-01 02:00:00,20\n";

pub fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Hourly readings `0..rows` with a `site` label, written through polars.
pub fn write_readings_csv(dir: &Path, rows: i64) -> PathBuf {
    let path = dir.join("readings.csv");
    let mut df = df!(
        "Time" => (0..rows)
            .map(|i| format!("2024-03-01 {:02}:00:00", i % 24))
            .collect::<Vec<String>>(),
        "pm25" => (0..rows).map(|i| i as f64).collect::<Vec<f64>>(),
        "site" => (0..rows).map(|i| format!("s{}", i % 3)).collect::<Vec<String>>()
    )
    .unwrap();
    let mut file = File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(&mut df).unwrap();
    path
}

/// Feed an event and every follow-up event it produces.
pub fn drive(app: &mut App, event: AppEvent) {
    let mut next = Some(event);
    while let Some(event) = next {
        next = app.event(&event);
    }
}

pub fn press(app: &mut App, code: KeyCode) {
    drive(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
}
