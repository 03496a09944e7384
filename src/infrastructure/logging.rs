use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::domain::settings::{self, LogSettings};

/// Keeps the non-blocking file writers alive; dropping it loses buffered
/// log lines.
pub struct LoggingGuard {
    _guards: Vec<WorkerGuard>,
}

pub fn init_logger(log_settings: &LogSettings) -> anyhow::Result<LoggingGuard> {
    let mut guards = Vec::new();

    // RUST_LOG wins over the configured level, then "info".
    let level_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::from_str(&log_settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = if log_settings.console_logging_enabled {
        Some(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(true)
                .with_ansi(true),
        )
    } else {
        None
    };

    let file_layer = if log_settings.file_logging_enabled {
        let file_appender = tracing_appender::rolling::RollingFileAppender::new(
            parse_rotation(&log_settings.rotation),
            resolve_log_dir(&log_settings.log_dir),
            &log_settings.file_name_prefix,
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        guards.push(guard);
        Some(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(level_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!("Logging initialized successfully");

    Ok(LoggingGuard { _guards: guards })
}

fn parse_rotation(value: &str) -> Rotation {
    match value.to_lowercase().as_str() {
        "hourly" => Rotation::HOURLY,
        "minutely" => Rotation::MINUTELY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

/// The app is rarely launched from a shell, so a relative log dir lands next
/// to settings.json rather than in whatever the working directory happens to
/// be. Absolute paths are used as given.
fn resolve_log_dir(dir: &str) -> PathBuf {
    let path = Path::new(dir);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match settings::app_config_dir() {
        Some(base) => base.join(path),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_strings_parse_case_insensitively() {
        assert_eq!(parse_rotation("hourly"), Rotation::HOURLY);
        assert_eq!(parse_rotation("Never"), Rotation::NEVER);
        assert_eq!(parse_rotation("daily"), Rotation::DAILY);
    }

    #[test]
    fn unknown_rotation_falls_back_to_daily() {
        assert_eq!(parse_rotation("weekly"), Rotation::DAILY);
        assert_eq!(parse_rotation(""), Rotation::DAILY);
    }

    #[test]
    fn absolute_log_dirs_pass_through() {
        let abs = std::env::temp_dir().join("govee-logs");
        assert_eq!(resolve_log_dir(abs.to_str().unwrap()), abs);
    }

    #[test]
    fn relative_log_dirs_land_under_the_config_dir() {
        if settings::app_config_dir().is_none() {
            return;
        }
        let resolved = resolve_log_dir("logs");
        assert!(resolved.ends_with(Path::new("GoveeBleController").join("logs")));
    }
}
