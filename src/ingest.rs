//! CSV ingestion and normalization.
//!
//! An upload is parsed once into a raw polars [`DataFrame`] and then normalized into a
//! [`TimeSeries`]: the optional `Time` column becomes the leading index column and the
//! measured column is renamed to `variable`. Every other column is kept as-is.

use polars::prelude::*;
use std::io::Cursor;
use tracing::debug;

use crate::error::IngestError;
use crate::error_display::user_message_from_polars;
use crate::timestamp::{nanos_to_millis, parse_timestamp_millis};

/// Name of the optional timestamp column. Matched exactly (case-sensitive).
pub const TIME_COLUMN: &str = "Time";
/// Canonical name of the measured column after normalization.
pub const VARIABLE_COLUMN: &str = "variable";

/// Field values read as missing, in any column.
pub const MISSING_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Which column of the upload holds the measured variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ValueColumn {
    /// First non-`Time` column when `Time` exists, otherwise column 0.
    #[default]
    Positional,
    /// An explicitly named column.
    Named(String),
}

impl ValueColumn {
    pub fn from_option(name: Option<String>) -> Self {
        match name {
            Some(name) if !name.trim().is_empty() => Self::Named(name),
            _ => Self::Positional,
        }
    }
}

/// A normalized upload: `[Time?, variable, others...]`, rows in upload order.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    frame: DataFrame,
    has_time: bool,
    source_column: String,
}

impl TimeSeries {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn has_time(&self) -> bool {
        self.has_time
    }

    /// Name the measured column had in the upload.
    pub fn source_column(&self) -> &str {
        &self.source_column
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn variable(&self) -> PolarsResult<&Column> {
        self.frame.column(VARIABLE_COLUMN)
    }

    /// Timestamps as milliseconds since the Unix epoch, positionally paired with `variable`.
    pub fn time_millis(&self) -> PolarsResult<Option<Vec<Option<i64>>>> {
        if !self.has_time {
            return Ok(None);
        }
        let time = self.frame.column(TIME_COLUMN)?.cast(&DataType::Int64)?;
        Ok(Some(time.i64()?.iter().collect()))
    }

    /// Keep only the rows where `mask` is true. Nulls in the mask drop the row.
    pub fn retain(&self, mask: &BooleanChunked) -> PolarsResult<Self> {
        Ok(Self {
            frame: self.frame.filter(mask)?,
            has_time: self.has_time,
            source_column: self.source_column.clone(),
        })
    }
}

/// Parse the uploaded bytes as a headered CSV table.
pub fn read_raw_table(bytes: &[u8]) -> Result<DataFrame, IngestError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(IngestError::Empty);
    }
    if let Some(line) = unterminated_quote(bytes) {
        return Err(IngestError::Malformed(format!(
            "quoted field opened on line {} is never closed",
            line
        )));
    }

    let read_options = CsvReadOptions::default()
        .with_has_header(true)
        // The whole upload is in memory; infer types from every row.
        .with_infer_schema_length(None)
        .map_parse_options(|opts| {
            opts.with_null_values(Some(NullValues::AllColumns(
                MISSING_TOKENS.iter().map(|t| (*t).into()).collect(),
            )))
        });
    let df = CsvReader::new(Cursor::new(bytes.to_vec()))
        .with_options(read_options)
        .finish()
        .map_err(|e| IngestError::Malformed(user_message_from_polars(&e)))?;

    if df.width() == 0 {
        return Err(IngestError::Empty);
    }
    Ok(df)
}

/// Line (1-based) of a quote that opens a field and is never closed.
///
/// Only a quote at the start of a field opens a quoted field; a `"` inside an
/// unquoted field is a literal character. Inside a quoted field `""` is an escape.
fn unterminated_quote(bytes: &[u8]) -> Option<usize> {
    let mut line = 1;
    let mut opened_on = None;
    let mut field_start = true;
    let mut iter = bytes.iter().peekable();
    while let Some(&b) = iter.next() {
        if opened_on.is_some() {
            match b {
                b'"' if iter.peek() == Some(&&b'"') => {
                    iter.next();
                }
                b'"' => {
                    opened_on = None;
                    field_start = false;
                }
                b'\n' => line += 1,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' if field_start => opened_on = Some(line),
            b',' => field_start = true,
            b'\n' => {
                line += 1;
                field_start = true;
            }
            b'\r' => {}
            _ => field_start = false,
        }
    }
    opened_on
}

/// Normalize an upload with the positional column rule.
pub fn normalize(bytes: &[u8]) -> Result<TimeSeries, IngestError> {
    normalize_with(bytes, &ValueColumn::Positional)
}

/// Normalize an upload, choosing the measured column with `selection`.
pub fn normalize_with(bytes: &[u8], selection: &ValueColumn) -> Result<TimeSeries, IngestError> {
    let raw = read_raw_table(bytes)?;
    normalize_table(&raw, selection)
}

/// Normalize an already parsed table. The input frame is not modified.
pub fn normalize_table(raw: &DataFrame, selection: &ValueColumn) -> Result<TimeSeries, IngestError> {
    let names: Vec<String> = raw
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let has_time = names.iter().any(|n| n == TIME_COLUMN);

    let value_name = match selection {
        ValueColumn::Named(name) => {
            if !names.contains(name) {
                return Err(IngestError::MissingColumn(name.clone()));
            }
            if has_time && name == TIME_COLUMN {
                return Err(IngestError::NoValueColumn(TIME_COLUMN.to_string()));
            }
            name.clone()
        }
        ValueColumn::Positional if has_time => names
            .iter()
            .find(|n| n.as_str() != TIME_COLUMN)
            .cloned()
            .ok_or_else(|| IngestError::NoValueColumn(TIME_COLUMN.to_string()))?,
        ValueColumn::Positional => names[0].clone(),
    };

    let mut columns: Vec<Column> = Vec::with_capacity(names.len());
    if has_time {
        let time = raw.column(TIME_COLUMN)?.as_materialized_series();
        columns.push(parse_time_column(time)?.into());
    }

    let mut value = raw.column(&value_name)?.clone();
    value.rename(VARIABLE_COLUMN.into());
    columns.push(value);

    for name in &names {
        if name != &value_name && !(has_time && name == TIME_COLUMN) {
            columns.push(raw.column(name)?.clone());
        }
    }

    let frame = DataFrame::new(columns)
        .map_err(|e| IngestError::Malformed(user_message_from_polars(&e)))?;

    debug!(
        rows = frame.height(),
        has_time,
        value_column = %value_name,
        "normalized upload"
    );

    Ok(TimeSeries {
        frame,
        has_time,
        source_column: value_name,
    })
}

/// Convert the raw `Time` column into a millisecond datetime column.
/// Any null or unparseable value fails the whole column.
fn parse_time_column(series: &Series) -> Result<Series, IngestError> {
    let millis: Vec<i64> = match series.dtype() {
        DataType::Datetime(_, _) | DataType::Date => {
            let casted = series.cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
            let physical = casted.cast(&DataType::Int64)?;
            physical
                .i64()?
                .iter()
                .enumerate()
                .map(|(i, v)| v.ok_or_else(|| invalid_timestamp(i, "")))
                .collect::<Result<_, _>>()?
        }
        dtype if dtype.is_integer() => {
            let ints = series.cast(&DataType::Int64)?;
            ints.i64()?
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    v.map(nanos_to_millis)
                        .ok_or_else(|| invalid_timestamp(i, ""))
                })
                .collect::<Result<_, _>>()?
        }
        _ => {
            let strings = series.cast(&DataType::String)?;
            strings
                .str()?
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let v = v.unwrap_or_default();
                    parse_timestamp_millis(v).ok_or_else(|| invalid_timestamp(i, v))
                })
                .collect::<Result<_, _>>()?
        }
    };

    Ok(Series::new(TIME_COLUMN.into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?)
}

/// Rows are reported 1-based, counting data rows only (the header is not a row).
fn invalid_timestamp(index: usize, value: &str) -> IngestError {
    IngestError::InvalidTimestamp {
        row: index + 1,
        value: value.to_string(),
    }
}
