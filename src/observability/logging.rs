//! Logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Default filter directive when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "ghibli_core=info,ghibli=info";
/// Filter directive used with `--verbose`.
pub const VERBOSE_FILTER: &str = "ghibli_core=debug,ghibli=debug";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parses a format name, ignoring case. Unknown names yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Event filter.
    pub filter: EnvFilter,
    /// Optional log file; stderr when `None`.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Resolves logging configuration.
    ///
    /// Precedence for the filter: `--verbose`, then `RUST_LOG`, then the config
    /// file, then [`DEFAULT_FILTER`]. `json_logs` forces JSON output.
    #[must_use]
    pub fn from_settings(
        settings: Option<&LoggingSettings>,
        verbose: bool,
        json_logs: bool,
    ) -> Self {
        let filter = if verbose {
            EnvFilter::new(VERBOSE_FILTER)
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                let directive = settings
                    .and_then(|s| s.filter.as_deref())
                    .unwrap_or(DEFAULT_FILTER);
                EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
            })
        };

        let format = if json_logs {
            LogFormat::Json
        } else {
            settings
                .and_then(|s| s.format.as_deref())
                .and_then(LogFormat::parse)
                .unwrap_or_default()
        };

        Self {
            format,
            filter,
            file: settings.and_then(|s| s.file.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("json", Some(LogFormat::Json); "json")]
    #[test_case("JSON", Some(LogFormat::Json); "uppercase")]
    #[test_case("pretty", Some(LogFormat::Pretty); "pretty")]
    #[test_case("text", Some(LogFormat::Pretty); "text alias")]
    #[test_case("xml", None; "unknown")]
    fn test_log_format_parse(input: &str, expected: Option<LogFormat>) {
        assert_eq!(LogFormat::parse(input), expected);
    }

    #[test]
    fn test_settings_and_flags() {
        let settings = LoggingSettings {
            format: Some("json".to_string()),
            filter: None,
            file: Some(PathBuf::from("/tmp/ghibli.log")),
        };

        let config = LoggingConfig::from_settings(Some(&settings), true, false);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/ghibli.log")));

        let config = LoggingConfig::from_settings(None, false, true);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.file.is_none());

        let config = LoggingConfig::from_settings(None, false, false);
        assert_eq!(config.format, LogFormat::Pretty);
    }
}
