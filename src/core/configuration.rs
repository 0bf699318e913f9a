//! Category configuration and resolved per-category settings
//!
//! [`CategoryConfiguration`] is what callers install (as the default, or for a
//! subtree). [`CategorySettings`] is the copy each registered category owns.

use super::{
    appender::Appender,
    category::Category,
    error::{LoggerError, Result},
    log_format::LogFormat,
    log_level::LogLevel,
    log_message::{LogMessage, MessageFormatter},
    runtime_settings::RuntimeSettings,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Builds the sink of a Custom root logger
pub type CustomLoggerFactory =
    Arc<dyn Fn(&Category, &RuntimeSettings) -> Box<dyn Appender> + Send + Sync>;

/// Kind of sink a root logger writes to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoggerType {
    #[default]
    Console,
    MessageBuffer,
    Custom,
}

impl FromStr for LoggerType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" => Ok(LoggerType::Console),
            "messagebuffer" | "message_buffer" | "buffer" => Ok(LoggerType::MessageBuffer),
            "custom" => Ok(LoggerType::Custom),
            _ => Err(format!("Invalid logger type: '{}'", s)),
        }
    }
}

/// Data-only configuration options, as loaded from JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationOptions {
    pub log_level: LogLevel,
    pub logger_type: LoggerType,
    pub log_format: LogFormat,
}

impl Default for ConfigurationOptions {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Error,
            logger_type: LoggerType::Console,
            log_format: LogFormat::default(),
        }
    }
}

/// Configuration installed as the default or for a category subtree
///
/// # Example
///
/// ```
/// use rust_category_logger::prelude::*;
///
/// let config = CategoryConfiguration::new(LogLevel::Info)
///     .with_logger_type(LoggerType::MessageBuffer)
///     .unwrap();
/// assert_eq!(config.log_level(), LogLevel::Info);
///
/// let loaded = CategoryConfiguration::from_json(r#"{"log_level": "Debug"}"#).unwrap();
/// assert_eq!(loaded.log_level(), LogLevel::Debug);
/// assert_eq!(loaded.logger_type(), LoggerType::Console);
/// ```
#[derive(Clone)]
pub struct CategoryConfiguration {
    log_level: LogLevel,
    logger_type: LoggerType,
    log_format: LogFormat,
    callback_logger: Option<CustomLoggerFactory>,
    formatter: Option<MessageFormatter>,
}

impl CategoryConfiguration {
    /// Console configuration at `log_level` with the default format
    pub fn new(log_level: LogLevel) -> Self {
        Self {
            log_level,
            logger_type: LoggerType::Console,
            log_format: LogFormat::default(),
            callback_logger: None,
            formatter: None,
        }
    }

    /// Custom configuration whose root loggers write to sinks built by `factory`
    pub fn custom<F>(log_level: LogLevel, factory: F) -> Self
    where
        F: Fn(&Category, &RuntimeSettings) -> Box<dyn Appender> + Send + Sync + 'static,
    {
        Self {
            log_level,
            logger_type: LoggerType::Custom,
            log_format: LogFormat::default(),
            callback_logger: Some(Arc::new(factory)),
            formatter: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let options: ConfigurationOptions = serde_json::from_str(json)?;
        Self::try_from(options)
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_log_format(mut self, log_format: LogFormat) -> Self {
        self.log_format = log_format;
        self
    }

    /// Switch the sink kind; `Custom` also needs a factory (see [`Self::custom`])
    pub fn with_logger_type(mut self, logger_type: LoggerType) -> Result<Self> {
        if logger_type == LoggerType::Custom && self.formatter.is_some() {
            return Err(LoggerError::ConflictingFormatterConfiguration);
        }
        self.logger_type = logger_type;
        Ok(self)
    }

    /// Set the message formatter; rejected for `Custom` configurations
    pub fn with_formatter<F>(mut self, formatter: F) -> Result<Self>
    where
        F: Fn(&LogMessage) -> String + Send + Sync + 'static,
    {
        if self.logger_type == LoggerType::Custom {
            return Err(LoggerError::ConflictingFormatterConfiguration);
        }
        self.formatter = Some(Arc::new(formatter));
        Ok(self)
    }

    /// Check that `Custom` and the factory go together
    pub fn validate(&self) -> Result<()> {
        match (self.logger_type, self.callback_logger.is_some()) {
            (LoggerType::Custom, false) => Err(LoggerError::config(
                "CategoryConfiguration",
                "logger type Custom requires a callback logger factory",
            )),
            (LoggerType::Console | LoggerType::MessageBuffer, true) => Err(LoggerError::config(
                "CategoryConfiguration",
                "a callback logger factory is only valid with logger type Custom",
            )),
            _ => Ok(()),
        }
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn logger_type(&self) -> LoggerType {
        self.logger_type
    }

    pub fn log_format(&self) -> &LogFormat {
        &self.log_format
    }

    pub fn callback_logger(&self) -> Option<&CustomLoggerFactory> {
        self.callback_logger.as_ref()
    }

    pub fn formatter(&self) -> Option<&MessageFormatter> {
        self.formatter.as_ref()
    }
}

impl Default for CategoryConfiguration {
    fn default() -> Self {
        Self::new(LogLevel::Error)
    }
}

impl TryFrom<ConfigurationOptions> for CategoryConfiguration {
    type Error = LoggerError;

    fn try_from(options: ConfigurationOptions) -> Result<Self> {
        if options.logger_type == LoggerType::Custom {
            return Err(LoggerError::config(
                "ConfigurationOptions",
                "logger type Custom cannot be loaded without a callback logger factory",
            ));
        }
        Ok(Self::new(options.log_level)
            .with_logger_type(options.logger_type)?
            .with_log_format(options.log_format))
    }
}

impl fmt::Debug for CategoryConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryConfiguration")
            .field("log_level", &self.log_level)
            .field("logger_type", &self.logger_type)
            .field("log_format", &self.log_format)
            .field("callback_logger", &self.callback_logger.is_some())
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

/// Settings owned by one registered category
#[derive(Clone)]
pub struct CategorySettings {
    category_path: String,
    log_level: LogLevel,
    logger_type: LoggerType,
    log_format: LogFormat,
    callback_logger: Option<CustomLoggerFactory>,
    formatter: Option<MessageFormatter>,
    /// Installed for a subtree rather than inherited from the default
    pub(crate) explicit: bool,
}

impl CategorySettings {
    pub(crate) fn from_configuration(
        category: &Category,
        config: &CategoryConfiguration,
        explicit: bool,
    ) -> Self {
        Self {
            category_path: category.path(),
            log_level: config.log_level,
            logger_type: config.logger_type,
            log_format: config.log_format.clone(),
            callback_logger: config.callback_logger.clone(),
            formatter: config.formatter.clone(),
            explicit,
        }
    }

    /// Replace everything but the category path with `config`
    pub(crate) fn apply(&mut self, config: &CategoryConfiguration, explicit: bool) {
        self.log_level = config.log_level;
        self.logger_type = config.logger_type;
        self.log_format = config.log_format.clone();
        self.callback_logger = config.callback_logger.clone();
        self.formatter = config.formatter.clone();
        self.explicit = explicit;
    }

    /// Copy of these settings for a newly registered descendant
    pub(crate) fn inherit_for(&self, category: &Category) -> Self {
        Self {
            category_path: category.path(),
            ..self.clone()
        }
    }

    pub fn category_path(&self) -> &str {
        &self.category_path
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn logger_type(&self) -> LoggerType {
        self.logger_type
    }

    pub fn log_format(&self) -> &LogFormat {
        &self.log_format
    }

    pub fn callback_logger(&self) -> Option<&CustomLoggerFactory> {
        self.callback_logger.as_ref()
    }

    pub fn formatter(&self) -> Option<&MessageFormatter> {
        self.formatter.as_ref()
    }

    pub fn set_log_level(&mut self, log_level: LogLevel) {
        self.log_level = log_level;
    }

    pub fn set_log_format(&mut self, log_format: LogFormat) {
        self.log_format = log_format;
    }

    /// Set or clear the formatter; rejected while the logger type is `Custom`
    pub fn set_formatter(&mut self, formatter: Option<MessageFormatter>) -> Result<()> {
        if formatter.is_some() && self.logger_type == LoggerType::Custom {
            return Err(LoggerError::ConflictingFormatterConfiguration);
        }
        self.formatter = formatter;
        Ok(())
    }
}

impl fmt::Debug for CategorySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategorySettings")
            .field("category_path", &self.category_path)
            .field("log_level", &self.log_level)
            .field("logger_type", &self.logger_type)
            .field("log_format", &self.log_format)
            .field("callback_logger", &self.callback_logger.is_some())
            .field("formatter", &self.formatter.is_some())
            .field("explicit", &self.explicit)
            .finish()
    }
}
