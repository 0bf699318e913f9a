//! Root loggers
//!
//! [`CategoryLogger`] is the concrete logger of one root category: a dispatch
//! queue bound to one sink. [`LoggerDelegate`] is the handle callers keep; its
//! target can be replaced when the root's configuration changes while the
//! handle itself stays the same object.

use super::{
    appender::Appender,
    category::Category,
    configuration::LoggerType,
    dispatch::{DispatchQueue, SettingsProvider},
    error::Result,
    log_level::LogLevel,
    log_message::{LogPayload, LoggedError},
    metrics::LoggerMetrics,
    stack::StackRenderer,
};
use crate::appenders::{MessageBuffer, MessageBufferAppender};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Default timeout when waiting for background work at shutdown (5 seconds)
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct CategoryLogger {
    queue: DispatchQueue,
    logger_type: LoggerType,
    buffer: Option<MessageBuffer>,
}

impl CategoryLogger {
    pub fn new(
        root: Category,
        logger_type: LoggerType,
        appender: Box<dyn Appender>,
        provider: Arc<dyn SettingsProvider>,
        renderer: Arc<dyn StackRenderer>,
    ) -> Self {
        Self {
            queue: DispatchQueue::new(root, appender, provider, renderer),
            logger_type,
            buffer: None,
        }
    }

    /// Logger writing rendered lines into an in-memory buffer
    pub fn message_buffer(
        root: Category,
        provider: Arc<dyn SettingsProvider>,
        renderer: Arc<dyn StackRenderer>,
    ) -> Self {
        let appender = MessageBufferAppender::new();
        let buffer = appender.buffer();
        Self {
            queue: DispatchQueue::new(root, Box::new(appender), provider, renderer),
            logger_type: LoggerType::MessageBuffer,
            buffer: Some(buffer),
        }
    }

    pub fn root(&self) -> &Category {
        self.queue.root()
    }

    pub fn logger_type(&self) -> LoggerType {
        self.logger_type
    }

    pub fn log<F>(
        &self,
        level: LogLevel,
        payload: F,
        error: Option<LoggedError>,
        categories: &[Category],
        resolved: bool,
    ) -> Result<()>
    where
        F: FnOnce() -> LogPayload,
    {
        self.queue.submit(level, payload, error, categories, resolved)
    }

    /// Rendered lines, for MessageBuffer loggers; empty otherwise
    pub fn messages(&self) -> Vec<String> {
        self.buffer
            .as_ref()
            .map(MessageBuffer::messages)
            .unwrap_or_default()
    }

    pub fn flush(&self) -> Result<()> {
        self.queue.flush()
    }

    pub fn pending_count(&self) -> usize {
        self.queue.pending_count()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.queue.metrics()
    }
}

impl fmt::Debug for CategoryLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryLogger")
            .field("root", self.root())
            .field("logger_type", &self.logger_type)
            .field("appender", &self.queue.appender_name())
            .field("pending", &self.pending_count())
            .finish()
    }
}

/// Swappable handle to the logger of a root category
pub struct LoggerDelegate {
    target: RwLock<Arc<CategoryLogger>>,
}

impl LoggerDelegate {
    pub(crate) fn new(target: CategoryLogger) -> Self {
        Self {
            target: RwLock::new(Arc::new(target)),
        }
    }

    /// Concrete logger currently receiving calls
    pub fn current(&self) -> Arc<CategoryLogger> {
        Arc::clone(&self.target.read())
    }

    /// Replace the target, returning the previous one
    pub(crate) fn swap(&self, target: CategoryLogger) -> Arc<CategoryLogger> {
        std::mem::replace(&mut *self.target.write(), Arc::new(target))
    }

    pub fn root(&self) -> Category {
        self.current().root().clone()
    }

    /// Log against `categories`, or the root when the list is empty
    pub fn log(
        &self,
        level: LogLevel,
        payload: impl Into<LogPayload>,
        error: Option<LoggedError>,
        categories: &[Category],
    ) -> Result<()> {
        let payload = payload.into();
        self.current()
            .log(level, move || payload, error, categories, false)
    }

    /// Like [`Self::log`], building the payload only if it will be logged
    pub fn log_lazy<F>(
        &self,
        level: LogLevel,
        payload: F,
        error: Option<LoggedError>,
        categories: &[Category],
    ) -> Result<()>
    where
        F: FnOnce() -> LogPayload,
    {
        self.current().log(level, payload, error, categories, false)
    }

    /// Log an already handled error at Error level, marked as resolved
    pub fn log_resolved(
        &self,
        payload: impl Into<LogPayload>,
        error: LoggedError,
        categories: &[Category],
    ) -> Result<()> {
        let payload = payload.into();
        self.current()
            .log(LogLevel::Error, move || payload, Some(error), categories, true)
    }

    /// Entry point used by the logging macros
    pub fn log_message(&self, level: LogLevel, message: impl Into<LogPayload>) -> Result<()> {
        self.log(level, message, None, &[])
    }

    #[inline]
    pub fn trace(&self, message: impl Into<LogPayload>) -> Result<()> {
        self.log(LogLevel::Trace, message, None, &[])
    }

    #[inline]
    pub fn debug(&self, message: impl Into<LogPayload>) -> Result<()> {
        self.log(LogLevel::Debug, message, None, &[])
    }

    #[inline]
    pub fn info(&self, message: impl Into<LogPayload>) -> Result<()> {
        self.log(LogLevel::Info, message, None, &[])
    }

    #[inline]
    pub fn warn(&self, message: impl Into<LogPayload>) -> Result<()> {
        self.log(LogLevel::Warn, message, None, &[])
    }

    #[inline]
    pub fn error(&self, message: impl Into<LogPayload>) -> Result<()> {
        self.log(LogLevel::Error, message, None, &[])
    }

    #[inline]
    pub fn fatal(&self, message: impl Into<LogPayload>) -> Result<()> {
        self.log(LogLevel::Fatal, message, None, &[])
    }

    pub fn error_with<E>(&self, message: impl Into<LogPayload>, error: E) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.log(LogLevel::Error, message, Some(Arc::new(error)), &[])
    }

    pub fn fatal_with<E>(&self, message: impl Into<LogPayload>, error: E) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.log(LogLevel::Fatal, message, Some(Arc::new(error)), &[])
    }

    pub fn resolved<E>(&self, message: impl Into<LogPayload>, error: E) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.log_resolved(message, Arc::new(error), &[])
    }

    /// Rendered lines of a MessageBuffer logger
    pub fn messages(&self) -> Vec<String> {
        self.current().messages()
    }

    pub fn flush(&self) -> Result<()> {
        self.current().flush()
    }

    /// Snapshot of the current target's metrics
    pub fn metrics(&self) -> LoggerMetrics {
        self.current().metrics().clone()
    }

    /// Wait until no message is waiting on a stack render
    ///
    /// Covers the target current at the call and any target swapped in while
    /// waiting. Returns `false` if messages are still pending after `timeout`.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_category_logger::prelude::*;
    /// use std::time::Duration;
    ///
    /// let runtime = RuntimeSettings::new();
    /// runtime
    ///     .set_default_configuration(
    ///         CategoryConfiguration::new(LogLevel::Info)
    ///             .with_logger_type(LoggerType::MessageBuffer)?,
    ///         true,
    ///     )?;
    /// let root = Category::new("app", &runtime)?;
    /// let logger = runtime.logger(&root)?;
    ///
    /// logger.error_with("request failed", std::io::Error::other("timeout"))?;
    /// logger.info("still running")?;
    ///
    /// assert!(logger.wait_for_pending(Duration::from_secs(5)));
    /// assert_eq!(logger.messages().len(), 2);
    /// # Ok::<(), LoggerError>(())
    /// ```
    pub fn wait_for_pending(&self, timeout: Duration) -> bool {
        let start = std::time::Instant::now();
        let initial = self.current();
        loop {
            if initial.pending_count() == 0 && self.current().pending_count() == 0 {
                return true;
            }
            if start.elapsed() >= timeout {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }
}

impl fmt::Debug for LoggerDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerDelegate")
            .field("target", &*self.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CategoryConfiguration, RuntimeSettings};

    fn buffer_runtime(level: LogLevel) -> RuntimeSettings {
        let config = CategoryConfiguration::new(level)
            .with_logger_type(LoggerType::MessageBuffer)
            .unwrap();
        RuntimeSettings::builder()
            .default_configuration(config)
            .build()
            .unwrap()
    }

    #[test]
    fn test_level_helpers_filter() {
        let runtime = buffer_runtime(LogLevel::Warn);
        let root = Category::new("root", &runtime).unwrap();
        let logger = runtime.logger(&root).unwrap();

        logger.trace("t").unwrap();
        logger.debug("d").unwrap();
        logger.info("i").unwrap();
        logger.warn("w").unwrap();
        logger.fatal("f").unwrap();

        let messages = logger.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].ends_with("WARN [root] w"));
        assert!(messages[1].ends_with("FATAL [root] f"));
        assert_eq!(logger.metrics().filtered_count(), 3);
    }

    #[test]
    fn test_resolved_marker() {
        let runtime = buffer_runtime(LogLevel::Trace);
        let root = Category::new("root", &runtime).unwrap();
        let logger = runtime.logger(&root).unwrap();

        logger
            .resolved("retry succeeded", std::io::Error::other("first attempt failed"))
            .unwrap();

        assert!(logger.wait_for_pending(DEFAULT_SHUTDOWN_TIMEOUT));
        let messages = logger.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("ERROR (resolved) [root] retry succeeded"));
        assert!(messages[0].ends_with("\nfirst attempt failed"));
    }

    #[test]
    fn test_swap_keeps_delegate_identity() {
        let runtime = buffer_runtime(LogLevel::Info);
        let root = Category::new("root", &runtime).unwrap();
        let logger = runtime.logger(&root).unwrap();
        logger.info("before").unwrap();

        let previous = logger.current();
        runtime
            .set_configuration_for_category(
                CategoryConfiguration::new(LogLevel::Info)
                    .with_logger_type(LoggerType::MessageBuffer)
                    .unwrap(),
                &root,
                true,
                true,
            )
            .unwrap();

        assert!(Arc::ptr_eq(&logger, &runtime.logger(&root).unwrap()));
        assert!(!Arc::ptr_eq(&previous, &logger.current()));
        assert_eq!(previous.messages().len(), 1);
        assert!(logger.messages().is_empty());
    }
}
