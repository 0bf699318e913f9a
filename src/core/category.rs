//! Category tree
//!
//! A [`Category`] is a named node in the logging scope hierarchy. Constructing
//! one registers it with its [`RuntimeSettings`] immediately, so every live
//! category has settings the moment it exists.

use super::{
    error::{LoggerError, Result},
    log_level::LogLevel,
    log_message::{LogPayload, LoggedError},
    logger::LoggerDelegate,
    runtime_settings::{RuntimeSettings, WeakRuntimeSettings},
};
use parking_lot::Mutex;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Separator used when joining category names into a path
pub const PATH_SEPARATOR: &str = "#";

static NEXT_CATEGORY_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a category object; two categories with the same path still
/// have different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CategoryId(u64);

/// Shared handle to a category node. Clones refer to the same node.
#[derive(Clone)]
pub struct Category {
    inner: Arc<CategoryInner>,
}

struct CategoryInner {
    id: CategoryId,
    name: String,
    parent: Option<Category>,
    children: Mutex<Vec<Weak<CategoryInner>>>,
    runtime: WeakRuntimeSettings,
}

impl Drop for CategoryInner {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.upgrade() {
            runtime.unregister(self.id);
        }
        if let Some(parent) = &self.parent {
            parent
                .inner
                .children
                .lock()
                .retain(|child| child.strong_count() > 0);
        }
    }
}

/// Check a category name against `^[A-Za-z0-9_]+$`
pub fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(LoggerError::invalid_name(name))
    }
}

impl Category {
    /// Create a root category registered with `runtime`
    ///
    /// # Example
    ///
    /// ```
    /// use rust_category_logger::prelude::*;
    ///
    /// let runtime = RuntimeSettings::new();
    /// let root = Category::new("service", &runtime).unwrap();
    /// let db = root.child("db").unwrap();
    ///
    /// assert!(root.is_root());
    /// assert_eq!(db.path(), "service#db");
    /// assert!(Category::new("bad#name", &runtime).is_err());
    /// ```
    pub fn new(name: impl Into<String>, runtime: &RuntimeSettings) -> Result<Self> {
        Self::create(name.into(), None, runtime)
    }

    /// Create a child of `parent`, registered with the parent's runtime settings
    pub fn with_parent(name: impl Into<String>, parent: &Category) -> Result<Self> {
        let runtime = parent.runtime_settings()?;
        Self::create(name.into(), Some(parent.clone()), &runtime)
    }

    pub fn child(&self, name: impl Into<String>) -> Result<Self> {
        Self::with_parent(name, self)
    }

    fn create(name: String, parent: Option<Category>, runtime: &RuntimeSettings) -> Result<Self> {
        validate_name(&name)?;

        let category = Category {
            inner: Arc::new(CategoryInner {
                id: CategoryId(NEXT_CATEGORY_ID.fetch_add(1, Ordering::Relaxed)),
                name,
                parent,
                children: Mutex::new(Vec::new()),
                runtime: runtime.downgrade(),
            }),
        };

        if let Some(parent) = &category.inner.parent {
            parent
                .inner
                .children
                .lock()
                .push(Arc::downgrade(&category.inner));
        }
        runtime.register(&category);

        Ok(category)
    }

    #[inline]
    pub fn id(&self) -> CategoryId {
        self.inner.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[inline]
    pub fn parent(&self) -> Option<&Category> {
        self.inner.parent.as_ref()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.inner.parent.is_none()
    }

    /// Topmost ancestor (the category itself when it is a root)
    pub fn root(&self) -> Category {
        let mut current = self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current.clone()
    }

    /// Live children in creation order
    pub fn children(&self) -> Vec<Category> {
        self.inner
            .children
            .lock()
            .iter()
            .filter_map(Weak::upgrade)
            .map(|inner| Category { inner })
            .collect()
    }

    /// Names from the topmost ancestor down to this category, joined by `#`
    pub fn path(&self) -> String {
        let mut names = vec![self.name()];
        let mut current = self.parent();
        while let Some(parent) = current {
            names.push(parent.name());
            current = parent.parent();
        }
        names.reverse();
        names.join(PATH_SEPARATOR)
    }

    /// Registry this category was created in
    ///
    /// Categories do not keep their registry alive; once every
    /// [`RuntimeSettings`] handle is dropped this fails with
    /// [`LoggerError::CategoryNotRegistered`].
    pub fn runtime_settings(&self) -> Result<RuntimeSettings> {
        self.inner
            .runtime
            .upgrade()
            .ok_or_else(|| LoggerError::not_registered(self.path()))
    }

    /// Logger issued for this category's root
    pub fn logger(&self) -> Result<Arc<LoggerDelegate>> {
        self.runtime_settings()?.logger(&self.root())
    }

    /// Log against this category through its root's logger
    pub fn log(
        &self,
        level: LogLevel,
        payload: impl Into<LogPayload>,
        error: Option<LoggedError>,
    ) -> Result<()> {
        self.logger()?
            .log(level, payload, error, std::slice::from_ref(self))
    }

    /// Log with a payload that is only built if the level filter passes
    pub fn log_lazy<F>(&self, level: LogLevel, payload: F, error: Option<LoggedError>) -> Result<()>
    where
        F: FnOnce() -> LogPayload,
    {
        self.logger()?
            .log_lazy(level, payload, error, std::slice::from_ref(self))
    }

    /// Entry point used by the logging macros
    pub fn log_message(&self, level: LogLevel, message: impl Into<LogPayload>) -> Result<()> {
        self.log(level, message, None)
    }

    pub fn trace(&self, message: impl Into<LogPayload>) -> Result<()> {
        self.log(LogLevel::Trace, message, None)
    }

    pub fn debug(&self, message: impl Into<LogPayload>) -> Result<()> {
        self.log(LogLevel::Debug, message, None)
    }

    pub fn info(&self, message: impl Into<LogPayload>) -> Result<()> {
        self.log(LogLevel::Info, message, None)
    }

    pub fn warn(&self, message: impl Into<LogPayload>) -> Result<()> {
        self.log(LogLevel::Warn, message, None)
    }

    pub fn error(&self, message: impl Into<LogPayload>) -> Result<()> {
        self.log(LogLevel::Error, message, None)
    }

    pub fn fatal(&self, message: impl Into<LogPayload>) -> Result<()> {
        self.log(LogLevel::Fatal, message, None)
    }

    pub fn error_with<E>(&self, message: impl Into<LogPayload>, error: E) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.log(LogLevel::Error, message, Some(Arc::new(error)))
    }

    pub fn fatal_with<E>(&self, message: impl Into<LogPayload>, error: E) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.log(LogLevel::Fatal, message, Some(Arc::new(error)))
    }

    /// Log an error that has already been handled
    pub fn resolved<E>(&self, message: impl Into<LogPayload>, error: E) -> Result<()>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.logger()?
            .log_resolved(message, Arc::new(error), std::slice::from_ref(self))
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Category {}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Category")
            .field("id", &self.inner.id)
            .field("path", &self.path())
            .finish()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
