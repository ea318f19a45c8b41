//! Provides configuration of a logger.
use env_logger::{Builder, Target};
use log::{trace, LevelFilter};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use time::OffsetDateTime;

/// Maximum number of times the verbose flag can be repeated.
const MAX_VERBOSITY: u8 = 4;

fn level_filter(verbosity: u8) -> Result<LevelFilter, String> {
    match verbosity {
        0 => Ok(LevelFilter::Error),
        1 => Ok(LevelFilter::Warn),
        2 => Ok(LevelFilter::Info),
        3 => Ok(LevelFilter::Debug),
        4 => Ok(LevelFilter::Trace),
        _ => Err(format!(
            "Verbose can be given at most {} times, got {}",
            MAX_VERBOSITY, verbosity
        )),
    }
}

/// Configures the log with the specified verbosity.
///
/// Higher verbosity results in additional log messages up to a maximum
/// verbosity level. Log messages go to standard error unless `log_file`
/// is given. Matches are never written to the log.
pub fn configure(verbosity: u8, log_file: Option<PathBuf>) -> Result<(), String> {
    let log_level = level_filter(verbosity)?;

    let mut builder = Builder::new();

    if let Some(log_location) = log_file {
        let file = File::create(&log_location).map_err(|e| {
            format!(
                "Unable to create log file {}. {}",
                log_location.display(),
                e
            )
        })?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}:{} {:?}] {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                OffsetDateTime::now_utc(),
                record.args()
            )
        })
        .filter_level(log_level)
        .try_init()
        .map_err(|e| format!("Unable to configure logger. {}", e))?;

    trace!("Logger verbosity {log_level}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_when_verbosity_is_5_then_return_err() {
        let result = configure(5, None);

        assert!(result.is_err());
    }

    #[test]
    fn level_filter_when_verbosity_in_range_then_increasing_detail() {
        assert_eq!(level_filter(0).unwrap(), LevelFilter::Error);
        assert_eq!(level_filter(2).unwrap(), LevelFilter::Info);
        assert_eq!(level_filter(4).unwrap(), LevelFilter::Trace);
    }

    #[test]
    fn configure_when_log_file_directory_missing_then_return_err() {
        let dir = tempfile::TempDir::new().unwrap();
        let log_file = dir.path().join("missing").join("log.txt");

        let result = configure(1, Some(log_file));

        assert!(result.unwrap_err().contains("Unable to create log file"));
    }
}
