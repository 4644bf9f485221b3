//! # Structured Logging
//!
//! Subscriber setup built on the tracing ecosystem. Logs go
//! to stderr so command output on stdout stays machine readable.

use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("Unsupported log format: '{}'. Use 'pretty' or 'json'.", other)),
        }
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the `verbose` default. Returns false when a
/// subscriber was already installed (e.g. by a test harness).
pub fn init_logging(verbose: bool, format: LogFormat) -> bool {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.is_ok()
}
