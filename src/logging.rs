//! File logging. The terminal belongs to the UI, so log lines go to the cache directory.

use color_eyre::Result;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cache::CacheManager;
use crate::config::LoggingConfig;

/// `RUST_LOG` wins over the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Install the global subscriber, appending to the cache log file.
/// Returns the log path, or `None` when logging is disabled.
pub fn init(config: &LoggingConfig, cache: &CacheManager) -> Result<Option<PathBuf>> {
    if !config.enabled {
        return Ok(None);
    }
    cache.ensure_cache_dir()?;
    let path = cache.log_file();
    init_with_file(config, &path)?;
    Ok(Some(path))
}

fn init_with_file(config: &LoggingConfig, path: &Path) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    fmt()
        .with_env_filter(env_filter(config))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| color_eyre::eyre::eyre!("Could not start logging: {}", e))
}
