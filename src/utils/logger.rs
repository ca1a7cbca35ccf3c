use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::utils::config::LoggingConfig;

/// Initialize logging system.
///
/// `RUST_LOG` takes precedence over `level`. When `log_file` is set,
/// output is appended there in either format instead of stdout.
pub fn init_logger(level: &str, json_output: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file = match log_file {
        Some(path) => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?,
        ),
        None => None,
    };

    let registry = tracing_subscriber::registry().with(filter);

    let result = match (json_output, file) {
        // JSON formatting for production
        (true, Some(file)) => registry
            .with(fmt::layer().json().with_writer(Mutex::new(file)))
            .try_init(),
        (true, None) => registry.with(fmt::layer().json()).try_init(),
        (false, Some(file)) => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .try_init(),
        (false, None) => registry.with(fmt::layer().with_target(false)).try_init(),
    };

    result.context("installing tracing subscriber")
}

/// Initialize logger from config
pub fn init_from_config(config: &LoggingConfig) -> Result<()> {
    let json = config.output == "json";
    let log_file = if !config.file_path.is_empty() {
        Some(Path::new(&config.file_path))
    } else {
        None
    };

    init_logger(&config.level, json, log_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_reports_error() {
        let config = LoggingConfig::default();

        // Another test may have installed a subscriber first; either way a
        // second install must fail without panicking.
        let _ = init_from_config(&config);
        assert!(init_from_config(&config).is_err());
    }

    #[test]
    fn test_pretty_output_opens_configured_file() {
        let config = LoggingConfig {
            file_path: "/nonexistent-log-dir/trader.log".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(config.output, "pretty");

        let err = init_from_config(&config).unwrap_err();
        assert!(err.to_string().contains("opening log file"));
    }
}
