//! Log message structure
//!
//! A [`LogMessage`] is built synchronously inside a log call. Messages that
//! carry an error start out not ready and are completed exactly once, when
//! the error's stack has been rendered.

use super::{category::Category, log_format::LogFormat, log_level::LogLevel};
use chrono::{DateTime, Local};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Error attached to a log call
pub type LoggedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Custom rendering of a structured payload's data
pub type DataStringifier = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Per-category replacement for the default message rendering
pub type MessageFormatter = Arc<dyn Fn(&LogMessage) -> String + Send + Sync>;

/// Structured payload: a message plus optional auxiliary data
///
/// # Example
///
/// ```
/// use rust_category_logger::core::{LogData, LogPayload};
/// use serde_json::json;
///
/// let payload: LogPayload = LogData::new("user created")
///     .with_data(json!({"id": 42}))
///     .into();
/// assert_eq!(payload.message_as_string(), "user created");
/// assert_eq!(payload.data_as_string().as_deref(), Some(r#"{"id":42}"#));
/// ```
#[derive(Clone)]
pub struct LogData {
    pub msg: String,
    pub data: Option<Value>,
    stringifier: Option<DataStringifier>,
}

impl LogData {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            data: None,
            stringifier: None,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Render `data` with `stringifier` instead of compact JSON
    #[must_use]
    pub fn with_stringifier<F>(mut self, stringifier: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.stringifier = Some(Arc::new(stringifier));
        self
    }

    pub fn data_as_string(&self) -> Option<String> {
        let data = self.data.as_ref()?;
        Some(match &self.stringifier {
            Some(stringify) => stringify(data),
            None => data.to_string(),
        })
    }
}

impl fmt::Debug for LogData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogData")
            .field("msg", &self.msg)
            .field("data", &self.data)
            .field("stringifier", &self.stringifier.is_some())
            .finish()
    }
}

/// Message payload of a log call
#[derive(Debug, Clone)]
pub enum LogPayload {
    Text(String),
    Data(LogData),
}

impl LogPayload {
    pub fn message_as_string(&self) -> &str {
        match self {
            LogPayload::Text(text) => text,
            LogPayload::Data(data) => &data.msg,
        }
    }

    pub fn data_as_string(&self) -> Option<String> {
        match self {
            LogPayload::Text(_) => None,
            LogPayload::Data(data) => data.data_as_string(),
        }
    }
}

impl From<&str> for LogPayload {
    fn from(text: &str) -> Self {
        LogPayload::Text(text.to_string())
    }
}

impl From<String> for LogPayload {
    fn from(text: String) -> Self {
        LogPayload::Text(text)
    }
}

impl From<LogData> for LogPayload {
    fn from(data: LogData) -> Self {
        LogPayload::Data(data)
    }
}

#[derive(Clone)]
pub struct LogMessage {
    pub(crate) message: LogPayload,
    pub(crate) error: Option<LoggedError>,
    pub(crate) error_as_stack: Option<String>,
    pub(crate) categories: Vec<Category>,
    pub(crate) date: DateTime<Local>,
    pub(crate) level: LogLevel,
    pub(crate) log_format: LogFormat,
    pub(crate) ready: bool,
    pub(crate) resolved_error_message: bool,
    pub(crate) formatter: Option<MessageFormatter>,
}

impl LogMessage {
    pub(crate) fn new(
        message: LogPayload,
        error: Option<LoggedError>,
        categories: Vec<Category>,
        level: LogLevel,
        log_format: LogFormat,
    ) -> Self {
        let ready = error.is_none();
        Self {
            message,
            error,
            error_as_stack: None,
            categories,
            date: Local::now(),
            level,
            log_format,
            ready,
            resolved_error_message: false,
            formatter: None,
        }
    }

    pub(crate) fn resolved(mut self, resolved: bool) -> Self {
        self.resolved_error_message = resolved;
        self
    }

    pub(crate) fn with_formatter(mut self, formatter: Option<MessageFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Attach the rendered stack and mark the message deliverable
    pub(crate) fn complete(&mut self, stack: String) {
        self.error_as_stack = Some(stack);
        self.ready = true;
    }

    pub fn message(&self) -> &LogPayload {
        &self.message
    }

    pub fn message_as_string(&self) -> &str {
        self.message.message_as_string()
    }

    pub fn error(&self) -> Option<&LoggedError> {
        self.error.as_ref()
    }

    pub fn error_as_stack(&self) -> Option<&str> {
        self.error_as_stack.as_deref()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Capture time of the log call
    pub fn date(&self) -> &DateTime<Local> {
        &self.date
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn log_format(&self) -> &LogFormat {
        &self.log_format
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_resolved_error_message(&self) -> bool {
        self.resolved_error_message
    }

    /// Render with the category's formatter, or the default layout
    pub fn render(&self) -> String {
        match &self.formatter {
            Some(formatter) => formatter(self),
            None => self.render_default(),
        }
    }

    /// `[date ]LEVEL[ (resolved)][ [cat, ...]] msg[ [data]: ...][\nstack]`
    pub fn render_default(&self) -> String {
        let mut line = String::new();

        if self.log_format.show_timestamp {
            line.push_str(&self.log_format.date_format.format(&self.date));
            line.push(' ');
        }

        line.push_str(self.level.to_str());
        if self.resolved_error_message {
            line.push_str(" (resolved)");
        }

        if self.log_format.show_category_name {
            let names: Vec<&str> = self.categories.iter().map(Category::name).collect();
            line.push_str(" [");
            line.push_str(&names.join(", "));
            line.push(']');
        }

        line.push(' ');
        line.push_str(self.message_as_string());
        if let Some(data) = self.message.data_as_string() {
            line.push_str(" [data]: ");
            line.push_str(&data);
        }

        if let Some(stack) = &self.error_as_stack {
            line.push('\n');
            line.push_str(stack);
        }

        line
    }
}

impl fmt::Debug for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogMessage")
            .field("message", &self.message)
            .field("error", &self.error.as_ref().map(|e| e.to_string()))
            .field("error_as_stack", &self.error_as_stack)
            .field("categories", &self.categories)
            .field("date", &self.date)
            .field("level", &self.level)
            .field("ready", &self.ready)
            .field("resolved_error_message", &self.resolved_error_message)
            .finish()
    }
}
