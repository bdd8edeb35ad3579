//! Shared CLI definitions for sensordash.

use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Compression format of an uploaded CSV file
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Gzip compression (.gz)
    Gzip,
    /// Zstandard compression (.zst)
    Zstd,
    /// Bzip2 compression (.bz2)
    Bzip2,
    /// XZ compression (.xz)
    Xz,
}

impl CompressionFormat {
    /// Detect compression format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        match ext.to_lowercase().as_str() {
            "gz" => Some(Self::Gzip),
            "zst" | "zstd" => Some(Self::Zstd),
            "bz2" | "bz" => Some(Self::Bzip2),
            "xz" => Some(Self::Xz),
            _ => None,
        }
    }

    /// Parse the name used in the config file (`gzip`, `zstd`, `bzip2`, `xz`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "gzip" => Some(Self::Gzip),
            "zstd" => Some(Self::Zstd),
            "bzip2" => Some(Self::Bzip2),
            "xz" => Some(Self::Xz),
            _ => None,
        }
    }

    /// Name used in the config file; the inverse of [`CompressionFormat::from_name`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Zstd => "zstd",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
        }
    }
}

/// Command-line arguments for sensordash
#[derive(Clone, Parser, Debug)]
#[command(
    name = "sensordash",
    version,
    about = "Urban sensor data analysis in the terminal",
    long_about = "Load a CSV of time-stamped sensor readings and explore it: charts, \
                  summary statistics, threshold filters with CSV export, and site information.\n\n\
                  If the CSV has a column named exactly `Time` it becomes the time index and the \
                  first other column is the measured variable; otherwise the first column is."
)]
pub struct Args {
    /// CSV file to load at startup. Another file can be opened from inside the app.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Use this column as the measured variable instead of the positional rule
    #[arg(long = "value-column", value_name = "NAME")]
    pub value_column: Option<String>,

    /// Specify the compression format explicitly (gzip, zstd, bzip2, xz).
    /// If not specified, compression is auto-detected from the file extension.
    #[arg(long = "compression", value_enum)]
    pub compression: Option<CompressionFormat>,

    /// Directory where the filtered CSV is written (default: current directory)
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Enable debug mode to show operational information
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Generate default configuration file at ~/.config/sensordash/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,

    /// Remove the log file and other cache data, then exit
    #[arg(long = "clear-cache", action)]
    pub clear_cache: bool,
}
