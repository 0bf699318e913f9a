//! Logging macros for ergonomic log message formatting.
//!
//! These macros format their arguments like `format!` and log the result
//! through anything with a `log_message(level, message)` method: a
//! [`LoggerDelegate`](crate::LoggerDelegate) logs against its root category,
//! a [`Category`](crate::Category) logs against itself. They evaluate to the
//! `Result` of the log call.
//!
//! # Examples
//!
//! ```
//! use rust_category_logger::prelude::*;
//! use rust_category_logger::{info, warn};
//!
//! let runtime = RuntimeSettings::new();
//! let root = Category::new("server", &runtime)?;
//! let logger = runtime.logger(&root)?;
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port)?;
//!
//! let pool = root.child("pool")?;
//! warn!(pool, "{} connections left", 2)?;
//! # Ok::<(), LoggerError>(())
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_category_logger::prelude::*;
/// # let runtime = RuntimeSettings::new();
/// # let root = Category::new("root", &runtime).unwrap();
/// use rust_category_logger::log;
/// log!(root, LogLevel::Info, "Simple message").unwrap();
/// log!(root, LogLevel::Error, "Error code: {}", 500).unwrap();
/// ```
#[macro_export]
macro_rules! log {
    ($target:expr, $level:expr, $($arg:tt)+) => {
        $target.log_message($level, format!($($arg)+))
    };
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($target:expr, $($arg:tt)+) => {
        $crate::log!($target, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($target:expr, $($arg:tt)+) => {
        $crate::log!($target, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($target:expr, $($arg:tt)+) => {
        $crate::log!($target, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($target:expr, $($arg:tt)+) => {
        $crate::log!($target, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($target:expr, $($arg:tt)+) => {
        $crate::log!($target, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($target:expr, $($arg:tt)+) => {
        $crate::log!($target, $crate::LogLevel::Fatal, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Category, CategoryConfiguration, LogFormat, LogLevel, LoggerType, RuntimeSettings};

    fn buffered_root() -> (RuntimeSettings, Category) {
        let runtime = RuntimeSettings::new();
        let config = CategoryConfiguration::new(LogLevel::Trace)
            .with_logger_type(LoggerType::MessageBuffer)
            .unwrap()
            .with_log_format(LogFormat {
                show_timestamp: false,
                ..LogFormat::default()
            });
        runtime.set_default_configuration(config, true).unwrap();
        let root = Category::new("root", &runtime).unwrap();
        (runtime, root)
    }

    #[test]
    fn test_log_macro() {
        let (_runtime, root) = buffered_root();
        let logger = root.logger().unwrap();

        log!(logger, LogLevel::Info, "Test message").unwrap();
        log!(logger, LogLevel::Info, "Formatted: {}", 42).unwrap();

        assert_eq!(
            logger.messages(),
            vec!["INFO [root] Test message", "INFO [root] Formatted: 42"]
        );
    }

    #[test]
    fn test_level_macros_on_logger() {
        let (_runtime, root) = buffered_root();
        let logger = root.logger().unwrap();

        trace!(logger, "Value: {}", 10).unwrap();
        debug!(logger, "Count: {}", 5).unwrap();
        info!(logger, "Items: {}", 100).unwrap();
        warn!(logger, "Retry {} of {}", 1, 3).unwrap();
        error!(logger, "Code: {}", 500).unwrap();
        fatal!(logger, "Critical failure: {}", "system").unwrap();

        let levels: Vec<String> = logger
            .messages()
            .iter()
            .map(|line| line.split(' ').next().unwrap_or_default().to_string())
            .collect();
        assert_eq!(levels, vec!["TRACE", "DEBUG", "INFO", "WARN", "ERROR", "FATAL"]);
    }

    #[test]
    fn test_macros_on_category() {
        let (_runtime, root) = buffered_root();
        let child = root.child("worker").unwrap();

        info!(child, "job {} done", 7).unwrap();

        assert_eq!(root.logger().unwrap().messages(), vec!["INFO [worker] job 7 done"]);
    }
}
