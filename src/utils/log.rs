//! Log Module

use colored::Colorize;
use std::sync::OnceLock;

static LOG_LEVEL: OnceLock<LogLevel> = OnceLock::new();

/// This enum is used to represent the different log levels
#[derive(PartialEq, PartialOrd, Debug, Clone, Copy)]
pub enum LogLevel {
    Debug,
    Info,
    Log,
    Warn,
    Error,
}

impl LogLevel {
    /// Maps the value of `MESONGO_LOG_LEVEL` to a level, falling back to `Log`
    fn from_env_value(value: &str) -> LogLevel {
        match value {
            "Debug" => LogLevel::Debug,
            "Info" => LogLevel::Info,
            "Log" => LogLevel::Log,
            "Warn" => LogLevel::Warn,
            "Error" => LogLevel::Error,
            _ => LogLevel::Log,
        }
    }
}

/// Reads the threshold once, the first time anything is logged
fn threshold() -> LogLevel {
    *LOG_LEVEL.get_or_init(|| {
        std::env::var("MESONGO_LOG_LEVEL")
            .map(|level| LogLevel::from_env_value(&level))
            .unwrap_or(LogLevel::Log)
    })
}

/// This function is used to log messages to the console
/// # Arguments
/// * `level` - The log level of the message
/// * `message` - The message to log
/// # Example
/// ```
/// use mesongo::utils::log::{log, LogLevel};
/// log(LogLevel::Info, "Hello World!");
/// log(LogLevel::Error, &format!("Something went wrong! {}", 42));
/// ```
///
/// # Level setting
/// The log level can be set by setting the environment variable `MESONGO_LOG_LEVEL`
/// to one of the following values:
/// * `Debug`
/// * `Info`
/// * `Log`
/// * `Warn`
/// * `Error`
///
/// If the environment variable is not set, the default log level is `Log`
pub fn log(level: LogLevel, message: &str) {
    let level_str = match level {
        LogLevel::Debug => "[DEBUG]".purple(),
        LogLevel::Info => "[INFO]".blue(),
        LogLevel::Log => "[LOG]".green(),
        LogLevel::Warn => "[WARN]".yellow(),
        LogLevel::Error => "[ERROR]".red(),
    };
    if level >= threshold() {
        println!("{} {}", level_str, message);
    }
}
