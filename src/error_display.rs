//! User-facing error message formatting.
//!
//! Messages are built by matching on error variants (PolarsError, io::ErrorKind, the crate's
//! own error enums), never by printing type names.

use polars::prelude::PolarsError;
use std::io;

use crate::error::{AnalysisError, IngestError, StatsError};

/// Message for one failed evaluation pass.
pub fn user_message(err: &AnalysisError) -> String {
    match err {
        AnalysisError::Ingest(e) => user_message_from_ingest(e),
        AnalysisError::Stats(e) => user_message_from_stats(e),
        AnalysisError::Polars(e) => user_message_from_polars(e),
    }
}

pub fn user_message_from_ingest(err: &IngestError) -> String {
    match err {
        IngestError::Empty => "The file is empty.".to_string(),
        IngestError::Malformed(msg) => format!("The file is not valid CSV: {}", msg),
        IngestError::MissingColumn(name) => format!("Column '{}' was not found.", name),
        IngestError::NoValueColumn(time) => {
            format!("The file has no data column besides '{}'.", time)
        }
        IngestError::InvalidTimestamp { row, value } if value.is_empty() => {
            format!("Missing timestamp in row {}.", row)
        }
        IngestError::InvalidTimestamp { row, value } => {
            format!("Could not read '{}' in row {} as a date.", value, row)
        }
        IngestError::Io(e) => user_message_from_io(e, None),
        IngestError::Polars(e) => user_message_from_polars(e),
    }
}

pub fn user_message_from_stats(err: &StatsError) -> String {
    match err {
        StatsError::NonNumeric { column, .. } => {
            format!("Column '{}' does not contain numbers.", column)
        }
        StatsError::NoValues(column) => format!("Column '{}' has no values.", column),
        StatsError::Polars(e) => user_message_from_polars(e),
    }
}

/// Format a PolarsError as a user-facing message by matching on its variant.
pub fn user_message_from_polars(err: &PolarsError) -> String {
    use polars::prelude::PolarsError as PE;

    match err {
        PE::ColumnNotFound(msg) => format!("Column not found: {}", msg),
        PE::Duplicate(msg) => format!("Duplicate column name: {}", msg),
        PE::IO { error, msg } => {
            user_message_from_io(error.as_ref(), msg.as_ref().map(|m| m.as_ref()))
        }
        PE::NoData(msg) => format!("No data: {}", msg),
        PE::SchemaMismatch(msg) => format!("Schema mismatch: {}", msg),
        PE::ShapeMismatch(msg) => format!("Rows have different lengths: {}", msg),
        PE::InvalidOperation(msg) => format!("Operation not allowed: {}", msg),
        PE::OutOfBounds(msg) => format!("Index out of bounds: {}", msg),
        PE::ComputeError(msg) => simplify_compute_message(msg),
        PE::Context { error, msg } => {
            let inner = user_message_from_polars(error);
            format!("{}: {}", msg, inner)
        }
        #[allow(unreachable_patterns)]
        _ => first_line(&err.to_string()),
    }
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error, context: Option<&str>) -> String {
    use std::io::ErrorKind;

    let base = match err.kind() {
        ErrorKind::NotFound => "File or directory not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check read access.".to_string(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            "Invalid or corrupted data.".to_string()
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        ErrorKind::IsADirectory => "Path is a directory, not a file.".to_string(),
        ErrorKind::OutOfMemory => "Out of memory.".to_string(),
        _ => first_line(&err.to_string()),
    };

    match context {
        Some(ctx) if !ctx.is_empty() => format!("{} {}", base, ctx),
        _ => base,
    }
}

/// Walk an eyre report for a known error type, falling back to its first line.
pub fn user_message_from_report(report: &color_eyre::eyre::Report) -> String {
    for cause in report.chain() {
        if let Some(e) = cause.downcast_ref::<AnalysisError>() {
            return user_message(e);
        }
        if let Some(e) = cause.downcast_ref::<IngestError>() {
            return user_message_from_ingest(e);
        }
        if let Some(e) = cause.downcast_ref::<PolarsError>() {
            return user_message_from_polars(e);
        }
        if let Some(e) = cause.downcast_ref::<io::Error>() {
            return user_message_from_io(e, None);
        }
    }
    first_line(&report.to_string())
}

/// Polars compute errors often carry a hint block after the first line.
fn simplify_compute_message(msg: &str) -> String {
    let line = first_line(msg);
    if line.contains("found more fields than defined") {
        return "A row has more fields than the header.".to_string();
    }
    if line.contains("invalid utf-8") || line.contains("invalid utf8") {
        return "The file is not valid UTF-8 text.".to_string();
    }
    line
}

fn first_line(s: &str) -> String {
    s.lines()
        .next()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or("An unknown error occurred")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found() {
        let e = io::Error::new(io::ErrorKind::NotFound, "x");
        assert_eq!(user_message_from_io(&e, None), "File or directory not found.");
        assert_eq!(
            user_message_from_io(&e, Some("(data.csv)")),
            "File or directory not found. (data.csv)"
        );
    }

    #[test]
    fn invalid_timestamp_mentions_row_and_value() {
        let err = AnalysisError::Ingest(IngestError::InvalidTimestamp {
            row: 3,
            value: "soon".to_string(),
        });
        let msg = user_message(&err);
        assert!(msg.contains("'soon'"));
        assert!(msg.contains("row 3"));
    }

    #[test]
    fn messages_do_not_leak_type_names() {
        let err = AnalysisError::Stats(StatsError::NonNumeric {
            column: "variable".to_string(),
            dtype: "str".to_string(),
        });
        let msg = user_message(&err);
        assert!(!msg.contains("StatsError"));
        assert!(!msg.contains("NonNumeric"));
    }

    #[test]
    fn compute_error_uses_first_line() {
        let e = PolarsError::ComputeError("bad thing\n\nhint: more".into());
        assert_eq!(user_message_from_polars(&e), "bad thing");
    }

    #[test]
    fn report_chain_finds_io_error() {
        let report = color_eyre::eyre::Report::new(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "nope",
        ));
        assert_eq!(
            user_message_from_report(&report),
            "Permission denied. Check read access."
        );
    }
}
