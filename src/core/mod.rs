//! Core types: categories, settings registry, dispatch queue and loggers

pub mod appender;
pub mod category;
pub mod configuration;
pub mod dispatch;
pub mod error;
pub mod log_format;
pub mod log_level;
pub mod log_message;
pub mod logger;
pub mod metrics;
pub mod runtime_settings;
pub mod stack;

pub use appender::Appender;
pub use category::{validate_name, Category, CategoryId, PATH_SEPARATOR};
pub use configuration::{
    CategoryConfiguration, CategorySettings, ConfigurationOptions, CustomLoggerFactory, LoggerType,
};
pub use dispatch::{DispatchQueue, SettingsProvider, StackCompletion};
pub use error::{LoggerError, Result};
pub use log_format::{DateFormat, DateFormatEnum, LogFormat};
pub use log_level::LogLevel;
pub use log_message::{DataStringifier, LogData, LogMessage, LogPayload, LoggedError, MessageFormatter};
pub use logger::{CategoryLogger, LoggerDelegate, DEFAULT_SHUTDOWN_TIMEOUT};
pub use metrics::LoggerMetrics;
pub use runtime_settings::{RuntimeSettings, RuntimeSettingsBuilder};
pub use stack::{render_error_chain, InlineStackRenderer, StackRenderer, WorkerStackRenderer};

#[cfg(feature = "tokio-renderer")]
pub use stack::{AsyncStackRenderer, SourceChainRenderer, TokioStackRenderer};
