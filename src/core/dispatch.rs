//! Ordered dispatch queue
//!
//! Log calls are turned into [`LogMessage`]s synchronously and appended to a
//! FIFO queue. Messages carrying an error stay not ready until their stack
//! has been rendered. Draining stops at the first message that is not ready,
//! so the appender always sees messages in submission order.

use super::{
    appender::Appender,
    category::Category,
    configuration::CategorySettings,
    error::{LoggerError, Result},
    log_level::LogLevel,
    log_message::{LogMessage, LogPayload, LoggedError},
    metrics::LoggerMetrics,
    stack::StackRenderer,
};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Resolves the settings of a category at log time
pub trait SettingsProvider: Send + Sync {
    fn category_settings(&self, category: &Category) -> Option<CategorySettings>;
}

pub struct DispatchQueue {
    root: Category,
    provider: Arc<dyn SettingsProvider>,
    renderer: Arc<dyn StackRenderer>,
    shared: Arc<DispatchShared>,
}

struct DispatchShared {
    state: Mutex<DispatchState>,
    metrics: LoggerMetrics,
}

struct DispatchState {
    pending: VecDeque<Pending>,
    next_seq: u64,
    appender: Box<dyn Appender>,
}

struct Pending {
    seq: u64,
    message: LogMessage,
}

impl DispatchQueue {
    pub fn new(
        root: Category,
        appender: Box<dyn Appender>,
        provider: Arc<dyn SettingsProvider>,
        renderer: Arc<dyn StackRenderer>,
    ) -> Self {
        Self {
            root,
            provider,
            renderer,
            shared: Arc::new(DispatchShared {
                state: Mutex::new(DispatchState {
                    pending: VecDeque::new(),
                    next_seq: 0,
                    appender,
                }),
                metrics: LoggerMetrics::new(),
            }),
        }
    }

    pub fn root(&self) -> &Category {
        &self.root
    }

    /// Filter, build and enqueue one log call
    ///
    /// `categories` defaults to the root when empty. The first category whose
    /// level lets `level` through supplies the format; the message is tagged
    /// with the whole list. `payload` is only evaluated if a category passes.
    pub fn submit<F>(
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
        let targets = if categories.is_empty() {
            vec![self.root.clone()]
        } else {
            categories.to_vec()
        };

        let mut selected = None;
        for category in &targets {
            let settings = self
                .provider
                .category_settings(category)
                .ok_or_else(|| LoggerError::not_registered(category.path()))?;
            if settings.log_level().allows(level) {
                selected = Some(settings);
                break;
            }
        }

        let Some(settings) = selected else {
            self.shared.metrics.record_filtered();
            return Ok(());
        };

        let message = LogMessage::new(
            payload(),
            error.clone(),
            targets,
            level,
            settings.log_format().clone(),
        )
        .resolved(resolved)
        .with_formatter(settings.formatter().cloned());

        match error {
            None => {
                let mut state = self.shared.state.lock();
                state.enqueue(message);
                self.shared.drain(&mut state);
            }
            Some(error) => {
                let seq = self.shared.state.lock().enqueue(message);
                // The renderer may complete inline, so the lock must be free here
                self.renderer
                    .render(error, StackCompletion::new(Arc::clone(&self.shared), seq));
            }
        }

        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        self.shared.state.lock().appender.flush()
    }

    /// Messages waiting for a stack render or behind one
    pub fn pending_count(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }

    pub fn appender_name(&self) -> String {
        self.shared.state.lock().appender.name().to_string()
    }
}

impl fmt::Debug for DispatchQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchQueue")
            .field("root", &self.root)
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl DispatchState {
    fn enqueue(&mut self, message: LogMessage) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push_back(Pending { seq, message });
        seq
    }
}

impl DispatchShared {
    /// Deliver ready messages from the head; stop at the first unready one
    fn drain(&self, state: &mut DispatchState) {
        while state.pending.front().is_some_and(|p| p.message.is_ready()) {
            let Some(Pending { message, .. }) = state.pending.pop_front() else {
                break;
            };
            self.deliver(state.appender.as_mut(), &message);
        }
    }

    /// Hand one message to the appender with panic isolation
    fn deliver(&self, appender: &mut dyn Appender, message: &LogMessage) {
        let result =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| appender.append(message)));

        match result {
            Ok(Ok(())) => {
                self.metrics.record_delivered();
            }
            Ok(Err(e)) => {
                eprintln!("[LOGGER ERROR] Appender '{}' failed: {}", appender.name(), e);
                self.metrics.record_failed_delivery();
            }
            Err(panic_info) => {
                eprintln!(
                    "[LOGGER CRITICAL] Appender '{}' panicked: {}. Later messages are still delivered.",
                    appender.name(),
                    panic_message(panic_info.as_ref())
                );
                self.metrics.record_failed_delivery();
            }
        }
    }

    fn finish(&self, seq: u64, result: std::result::Result<String, String>) {
        let mut state = self.state.lock();
        let Some(pending) = state.pending.iter_mut().find(|p| p.seq == seq) else {
            return;
        };

        let stack = match result {
            Ok(stack) => stack,
            Err(reason) => {
                self.metrics.record_render_failure();
                eprintln!("[LOGGER WARNING] Stack rendering failed: {}", reason);
                let error = pending
                    .message
                    .error()
                    .map(|e| {
                        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| e.to_string()))
                            .unwrap_or_else(|_| "<unprintable error>".to_string())
                    })
                    .unwrap_or_default();
                format!("{} (stack unavailable: {})", error, reason)
            }
        };
        pending.message.complete(stack);

        self.drain(&mut state);
    }
}

fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Continuation for one stack render
///
/// Completing it attaches the stack to its message, marks the message ready
/// and drains the queue. Dropping it without completing counts as a failed
/// render, so the message is still delivered.
pub struct StackCompletion {
    shared: Option<Arc<DispatchShared>>,
    seq: u64,
}

impl StackCompletion {
    fn new(shared: Arc<DispatchShared>, seq: u64) -> Self {
        Self {
            shared: Some(shared),
            seq,
        }
    }

    /// Resolve with the rendered stack, or the reason rendering failed
    pub fn complete(mut self, result: std::result::Result<String, String>) {
        if let Some(shared) = self.shared.take() {
            shared.finish(self.seq, result);
        }
    }
}

impl Drop for StackCompletion {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.finish(
                self.seq,
                Err("stack renderer dropped the request".to_string()),
            );
        }
    }
}

impl fmt::Debug for StackCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackCompletion")
            .field("seq", &self.seq)
            .field("completed", &self.shared.is_none())
            .finish()
    }
}
