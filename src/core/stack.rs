//! Error stack rendering
//!
//! Rendering an attached error is the one asynchronous step of a log call.
//! A [`StackRenderer`] receives the error together with a [`StackCompletion`]
//! and resolves it whenever the rendering is done, possibly on another thread.

use super::{dispatch::StackCompletion, log_message::LoggedError, logger::DEFAULT_SHUTDOWN_TIMEOUT};
use crossbeam_channel::{unbounded, Sender};
use parking_lot::Mutex;
use std::error::Error;
use std::thread;

pub trait StackRenderer: Send + Sync {
    /// Render `error` and resolve `completion`, now or later
    fn render(&self, error: LoggedError, completion: StackCompletion);
}

/// Render an error and its `source()` chain, one cause per line
///
/// # Example
///
/// ```
/// use rust_category_logger::core::render_error_chain;
///
/// let error = std::io::Error::other("disk full");
/// assert_eq!(render_error_chain(&error), "disk full");
/// ```
pub fn render_error_chain(error: &(dyn Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str("\n    caused by: ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

/// Render on the calling thread and complete before returning
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineStackRenderer;

impl StackRenderer for InlineStackRenderer {
    fn render(&self, error: LoggedError, completion: StackCompletion) {
        completion.complete(render_chain_isolated(&error));
    }
}

fn render_chain_isolated(error: &LoggedError) -> std::result::Result<String, String> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        render_error_chain(error.as_ref())
    }))
    .map_err(|_| "error Display implementation panicked".to_string())
}

struct RenderJob {
    error: LoggedError,
    completion: StackCompletion,
}

struct Worker {
    sender: Option<Sender<RenderJob>>,
    handle: Option<thread::JoinHandle<()>>,
}

/// Renders stacks on a background thread, started on first use
///
/// Completions run on the worker thread, after the log call has returned.
#[derive(Default)]
pub struct WorkerStackRenderer {
    worker: Mutex<Option<Worker>>,
}

impl WorkerStackRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn spawn_worker() -> std::io::Result<Worker> {
        let (sender, receiver) = unbounded::<RenderJob>();
        let handle = thread::Builder::new()
            .name("stack-renderer".to_string())
            .spawn(move || {
                for job in receiver {
                    let result = render_chain_isolated(&job.error);
                    job.completion.complete(result);
                }
            })?;

        Ok(Worker {
            sender: Some(sender),
            handle: Some(handle),
        })
    }
}

impl StackRenderer for WorkerStackRenderer {
    fn render(&self, error: LoggedError, completion: StackCompletion) {
        let job = RenderJob { error, completion };

        let job = {
            let mut worker = self.worker.lock();
            if worker.is_none() {
                match Self::spawn_worker() {
                    Ok(spawned) => *worker = Some(spawned),
                    Err(e) => {
                        eprintln!(
                            "[LOGGER WARNING] Could not start stack renderer thread: {}. Rendering inline.",
                            e
                        );
                    }
                }
            }

            match worker.as_ref().and_then(|w| w.sender.as_ref()) {
                Some(sender) => match sender.send(job) {
                    Ok(()) => return,
                    Err(returned) => returned.into_inner(),
                },
                None => job,
            }
        };

        // Worker unavailable; the lock is released before completing
        job.completion.complete(render_chain_isolated(&job.error));
    }
}

impl Drop for WorkerStackRenderer {
    fn drop(&mut self) {
        let Some(mut worker) = self.worker.lock().take() else {
            return;
        };

        // Close the channel so the worker drains remaining jobs and exits
        drop(worker.sender.take());

        let Some(handle) = worker.handle.take() else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            return;
        }

        let start = std::time::Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!("[LOGGER ERROR] Stack renderer thread panicked during shutdown: {:?}", e);
                }
                break;
            }

            if start.elapsed() >= DEFAULT_SHUTDOWN_TIMEOUT {
                eprintln!(
                    "[LOGGER WARNING] Stack renderer thread did not finish within {:?} timeout. \
                     Some messages may stay pending.",
                    DEFAULT_SHUTDOWN_TIMEOUT
                );
                break;
            }

            thread::sleep(std::time::Duration::from_millis(10));
        }
    }
}

#[cfg(feature = "tokio-renderer")]
pub use self::tokio_renderer::{AsyncStackRenderer, SourceChainRenderer, TokioStackRenderer};

#[cfg(feature = "tokio-renderer")]
mod tokio_renderer {
    use super::{render_error_chain, StackCompletion, StackRenderer};
    use crate::core::error::{LoggerError, Result};
    use crate::core::log_message::LoggedError;
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Asynchronous stack rendering, driven by a tokio runtime
    #[async_trait]
    pub trait AsyncStackRenderer: Send + Sync {
        async fn render(&self, error: &LoggedError) -> std::result::Result<String, String>;
    }

    /// Renders the `source()` chain without blocking
    #[derive(Debug, Default, Clone, Copy)]
    pub struct SourceChainRenderer;

    #[async_trait]
    impl AsyncStackRenderer for SourceChainRenderer {
        async fn render(&self, error: &LoggedError) -> std::result::Result<String, String> {
            Ok(render_error_chain(error.as_ref()))
        }
    }

    /// Spawns each render as a task on a tokio runtime
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rust_category_logger::core::{SourceChainRenderer, TokioStackRenderer};
    /// use rust_category_logger::RuntimeSettings;
    /// use std::sync::Arc;
    ///
    /// # async fn run() -> rust_category_logger::Result<()> {
    /// let renderer = TokioStackRenderer::try_current(SourceChainRenderer)?;
    /// let runtime = RuntimeSettings::builder()
    ///     .stack_renderer(Arc::new(renderer))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub struct TokioStackRenderer<R> {
        handle: tokio::runtime::Handle,
        inner: Arc<R>,
    }

    impl<R: AsyncStackRenderer + 'static> TokioStackRenderer<R> {
        pub fn with_handle(handle: tokio::runtime::Handle, inner: R) -> Self {
            Self {
                handle,
                inner: Arc::new(inner),
            }
        }

        /// Bind to the runtime of the calling context
        pub fn try_current(inner: R) -> Result<Self> {
            let handle = tokio::runtime::Handle::try_current()
                .map_err(|e| LoggerError::config("TokioStackRenderer", e.to_string()))?;
            Ok(Self::with_handle(handle, inner))
        }
    }

    impl<R: AsyncStackRenderer + 'static> StackRenderer for TokioStackRenderer<R> {
        fn render(&self, error: LoggedError, completion: StackCompletion) {
            let inner = Arc::clone(&self.inner);
            self.handle.spawn(async move {
                let result = inner.render(&error).await;
                completion.complete(result);
            });
        }
    }
}
