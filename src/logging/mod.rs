// Logging module - tracing subscriber setup
//
// Human-readable logs go to stderr so `proofview list` and `render -o -` keep
// stdout clean. With file logging enabled, a JSON layer also writes to a
// rolling file through a non-blocking writer.
//
// Precedence: RUST_LOG env var > config file level > default "info"

use crate::config::{LogRotation, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when RUST_LOG is unset
pub fn default_filter(level: &str) -> String {
    format!("proofview={},tower_http=warn,axum=warn", level)
}

fn file_appender(config: &LoggingConfig) -> RollingFileAppender {
    let dir = &config.file_dir;
    let prefix = &config.file_prefix;
    match config.file_rotation {
        LogRotation::Hourly => tracing_appender::rolling::hourly(dir, prefix),
        LogRotation::Daily => tracing_appender::rolling::daily(dir, prefix),
        LogRotation::Never => tracing_appender::rolling::never(dir, prefix),
    }
}

/// Install the global subscriber
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for the duration of the program.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(&config.level).into());

    let (file_layer, guard) = if config.file_enabled {
        match std::fs::create_dir_all(&config.file_dir) {
            Ok(()) => {
                let (writer, guard) = tracing_appender::non_blocking(file_appender(config));
                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false);
                (Some(layer), Some(guard))
            }
            Err(e) => {
                // Subscriber isn't up yet, so this can't go through tracing
                eprintln!(
                    "Warning: Could not create log directory {:?}: {}",
                    config.file_dir, e
                );
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_uses_config_level() {
        assert_eq!(
            default_filter("debug"),
            "proofview=debug,tower_http=warn,axum=warn"
        );
        assert!(default_filter("info").parse::<EnvFilter>().is_ok());
    }

    #[test]
    fn test_file_appender_writes_under_configured_dir() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            file_enabled: true,
            file_dir: dir.path().to_path_buf(),
            file_rotation: LogRotation::Never,
            ..Default::default()
        };

        let mut appender = file_appender(&config);
        appender.write_all(b"{}\n").unwrap();
        appender.flush().unwrap();
        assert!(dir.path().join("proofview").exists());
    }
}
