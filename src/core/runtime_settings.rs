//! Runtime settings registry
//!
//! [`RuntimeSettings`] maps every registered category to its own
//! [`CategorySettings`], holds the default configuration new categories
//! inherit, and issues one [`LoggerDelegate`] per root category. It is a
//! cheap-to-clone handle; tests create a fresh instance per run.

use super::{
    category::{Category, CategoryId},
    configuration::{CategoryConfiguration, CategorySettings, LoggerType},
    dispatch::SettingsProvider,
    error::{LoggerError, Result},
    logger::{CategoryLogger, LoggerDelegate},
    stack::{StackRenderer, WorkerStackRenderer},
};
use crate::appenders::ConsoleAppender;
use parking_lot::{ReentrantMutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

#[derive(Clone)]
pub struct RuntimeSettings {
    inner: Arc<RuntimeInner>,
}

struct RuntimeInner {
    state: RwLock<RegistryState>,
    /// Serializes logger construction with the resets that rebuild loggers
    construction: ReentrantMutex<()>,
    stack_renderer: RwLock<Arc<dyn StackRenderer>>,
}

/// Non-owning handle held by categories
#[derive(Clone)]
pub(crate) struct WeakRuntimeSettings(Weak<RuntimeInner>);

impl WeakRuntimeSettings {
    pub(crate) fn upgrade(&self) -> Option<RuntimeSettings> {
        self.0.upgrade().map(|inner| RuntimeSettings { inner })
    }
}

#[derive(Default)]
struct RegistryState {
    settings: HashMap<CategoryId, CategorySettings>,
    default_config: CategoryConfiguration,
    loggers: HashMap<CategoryId, Arc<LoggerDelegate>>,
}

/// Settings lookups for dispatch queues; does not keep the registry alive
struct RegistryProvider(Weak<RuntimeInner>);

impl SettingsProvider for RegistryProvider {
    fn category_settings(&self, category: &Category) -> Option<CategorySettings> {
        let inner = self.0.upgrade()?;
        let state = inner.state.read();
        state.settings.get(&category.id()).cloned()
    }
}

impl RuntimeSettings {
    /// Empty registry with the default configuration (Error, Console)
    pub fn new() -> Self {
        Self::with_parts(
            CategoryConfiguration::default(),
            Arc::new(WorkerStackRenderer::new()),
        )
    }

    fn with_parts(default_config: CategoryConfiguration, renderer: Arc<dyn StackRenderer>) -> Self {
        Self {
            inner: Arc::new(RuntimeInner {
                state: RwLock::new(RegistryState {
                    default_config,
                    ..RegistryState::default()
                }),
                construction: ReentrantMutex::new(()),
                stack_renderer: RwLock::new(renderer),
            }),
        }
    }

    #[must_use]
    pub fn builder() -> RuntimeSettingsBuilder {
        RuntimeSettingsBuilder::new()
    }

    /// Give `category` settings unless it already has some
    ///
    /// A category under an explicitly configured parent inherits the parent's
    /// settings; otherwise it gets a copy of the current default. The entry
    /// is removed again when the last handle to the category is dropped.
    pub fn register(&self, category: &Category) {
        let mut state = self.inner.state.write();
        if state.settings.contains_key(&category.id()) {
            return;
        }

        let inherited = category
            .parent()
            .and_then(|parent| state.settings.get(&parent.id()))
            .filter(|parent_settings| parent_settings.explicit)
            .map(|parent_settings| parent_settings.inherit_for(category));

        let settings = inherited.unwrap_or_else(|| {
            CategorySettings::from_configuration(category, &state.default_config, false)
        });
        state.settings.insert(category.id(), settings);
    }

    /// Forget the settings of a dropped category
    pub(crate) fn unregister(&self, id: CategoryId) {
        self.inner.state.write().settings.remove(&id);
    }

    pub(crate) fn downgrade(&self) -> WeakRuntimeSettings {
        WeakRuntimeSettings(Arc::downgrade(&self.inner))
    }

    /// Settings of `category`, or `None` if it was never registered here
    pub fn settings(&self, category: &Category) -> Option<CategorySettings> {
        self.inner.state.read().settings.get(&category.id()).cloned()
    }

    /// Edit one category's settings in place
    ///
    /// The change is applied only if `modify` succeeds.
    pub fn modify_settings<F>(&self, category: &Category, modify: F) -> Result<()>
    where
        F: FnOnce(&mut CategorySettings) -> Result<()>,
    {
        let mut state = self.inner.state.write();
        let current = state
            .settings
            .get_mut(&category.id())
            .ok_or_else(|| LoggerError::not_registered(category.path()))?;

        let mut updated = current.clone();
        modify(&mut updated)?;
        *current = updated;
        Ok(())
    }

    pub fn default_configuration(&self) -> CategoryConfiguration {
        self.inner.state.read().default_config.clone()
    }

    /// Install a new default configuration
    ///
    /// With `reset_existing`, every registered category gets its own fresh
    /// copy of `config` and issued root loggers are rebuilt behind their
    /// delegates. Otherwise only categories registered later are affected.
    pub fn set_default_configuration(
        &self,
        config: CategoryConfiguration,
        reset_existing: bool,
    ) -> Result<()> {
        config.validate()?;
        let _construction = self.inner.construction.lock();

        let delegates: Vec<Arc<LoggerDelegate>> = {
            let mut state = self.inner.state.write();
            state.default_config = config.clone();
            if !reset_existing {
                return Ok(());
            }
            for settings in state.settings.values_mut() {
                settings.apply(&config, false);
            }
            state.loggers.values().cloned().collect()
        };

        for delegate in delegates {
            self.reset_logger(&delegate)?;
        }
        Ok(())
    }

    /// Override the settings of `category`, and of its subtree if `include_children`
    ///
    /// Categories created later under an overridden category inherit the
    /// override. With `reset_root_logger`, an already issued logger for the
    /// category's root is rebuilt so a sink change takes effect.
    pub fn set_configuration_for_category(
        &self,
        config: CategoryConfiguration,
        category: &Category,
        include_children: bool,
        reset_root_logger: bool,
    ) -> Result<()> {
        config.validate()?;
        let _construction = self.inner.construction.lock();

        let mut targets = vec![category.clone()];
        if include_children {
            let mut index = 0;
            while index < targets.len() {
                let children = targets[index].children();
                targets.extend(children);
                index += 1;
            }
        }

        {
            let mut state = self.inner.state.write();
            for target in &targets {
                state.settings.insert(
                    target.id(),
                    CategorySettings::from_configuration(target, &config, true),
                );
            }
        }

        if reset_root_logger {
            let root = category.root();
            if let Some(delegate) = self.issued_logger(&root) {
                self.reset_logger(&delegate)?;
            }
        }
        Ok(())
    }

    /// Logger for a root category, created on first request
    ///
    /// # Example
    ///
    /// ```
    /// use rust_category_logger::prelude::*;
    /// use std::sync::Arc;
    ///
    /// let runtime = RuntimeSettings::new();
    /// let root = Category::new("root", &runtime).unwrap();
    /// let child = root.child("child").unwrap();
    ///
    /// let first = runtime.logger(&root).unwrap();
    /// let second = runtime.logger(&root).unwrap();
    /// assert!(Arc::ptr_eq(&first, &second));
    ///
    /// assert!(matches!(
    ///     runtime.logger(&child),
    ///     Err(LoggerError::NonRootCategoryLookup { .. })
    /// ));
    /// ```
    pub fn logger(&self, root: &Category) -> Result<Arc<LoggerDelegate>> {
        if !root.is_root() {
            return Err(LoggerError::non_root(root.path()));
        }

        if let Some(delegate) = self.issued_logger(root) {
            return Ok(delegate);
        }

        // Resets wait for this, so no reset can slip between build and insert.
        // The state lock stays free: a custom factory may query the registry.
        let _construction = self.inner.construction.lock();
        if let Some(delegate) = self.issued_logger(root) {
            return Ok(delegate);
        }

        let delegate = Arc::new(LoggerDelegate::new(self.build_logger(root)?));
        self.inner
            .state
            .write()
            .loggers
            .insert(root.id(), Arc::clone(&delegate));
        Ok(delegate)
    }

    fn issued_logger(&self, root: &Category) -> Option<Arc<LoggerDelegate>> {
        self.inner.state.read().loggers.get(&root.id()).cloned()
    }

    fn build_logger(&self, root: &Category) -> Result<CategoryLogger> {
        let settings = self
            .settings(root)
            .ok_or_else(|| LoggerError::not_registered(root.path()))?;
        let provider: Arc<dyn SettingsProvider> =
            Arc::new(RegistryProvider(Arc::downgrade(&self.inner)));
        let renderer = self.stack_renderer();

        let logger = match settings.logger_type() {
            LoggerType::Console => CategoryLogger::new(
                root.clone(),
                LoggerType::Console,
                Box::new(ConsoleAppender::new()),
                provider,
                renderer,
            ),
            LoggerType::MessageBuffer => CategoryLogger::message_buffer(root.clone(), provider, renderer),
            LoggerType::Custom => {
                let factory = settings.callback_logger().cloned().ok_or_else(|| {
                    LoggerError::config(
                        "CategorySettings",
                        format!("category '{}' is Custom but has no callback logger", root.path()),
                    )
                })?;
                let appender = factory(root, self);
                CategoryLogger::new(root.clone(), LoggerType::Custom, appender, provider, renderer)
            }
        };
        Ok(logger)
    }

    fn reset_logger(&self, delegate: &LoggerDelegate) -> Result<()> {
        let logger = self.build_logger(&delegate.root())?;
        delegate.swap(logger);
        Ok(())
    }

    pub fn stack_renderer(&self) -> Arc<dyn StackRenderer> {
        Arc::clone(&self.inner.stack_renderer.read())
    }

    /// Renderer used by loggers created from now on
    pub fn set_stack_renderer(&self, renderer: Arc<dyn StackRenderer>) {
        *self.inner.stack_renderer.write() = renderer;
    }

    /// Forget all categories, issued loggers and the default configuration
    ///
    /// Categories created before the call are no longer registered; logging
    /// against them fails with [`LoggerError::CategoryNotRegistered`].
    pub fn clear(&self) {
        let _construction = self.inner.construction.lock();
        let previous = std::mem::take(&mut *self.inner.state.write());
        // Dropping issued loggers may drop categories, which unregister themselves
        drop(previous);
    }

    pub fn category_count(&self) -> usize {
        self.inner.state.read().settings.len()
    }

    pub fn logger_count(&self) -> usize {
        self.inner.state.read().loggers.len()
    }
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RuntimeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("RuntimeSettings")
            .field("categories", &state.settings.len())
            .field("loggers", &state.loggers.len())
            .field("default_config", &state.default_config)
            .finish()
    }
}

/// Builder for [`RuntimeSettings`]
///
/// # Example
/// ```
/// use rust_category_logger::prelude::*;
/// use std::sync::Arc;
///
/// let runtime = RuntimeSettings::builder()
///     .default_configuration(CategoryConfiguration::new(LogLevel::Debug))
///     .stack_renderer(Arc::new(InlineStackRenderer))
///     .build()
///     .unwrap();
/// assert_eq!(runtime.default_configuration().log_level(), LogLevel::Debug);
/// ```
pub struct RuntimeSettingsBuilder {
    default_config: CategoryConfiguration,
    stack_renderer: Option<Arc<dyn StackRenderer>>,
}

impl RuntimeSettingsBuilder {
    pub fn new() -> Self {
        Self {
            default_config: CategoryConfiguration::default(),
            stack_renderer: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn default_configuration(mut self, config: CategoryConfiguration) -> Self {
        self.default_config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn stack_renderer(mut self, renderer: Arc<dyn StackRenderer>) -> Self {
        self.stack_renderer = Some(renderer);
        self
    }

    pub fn build(self) -> Result<RuntimeSettings> {
        self.default_config.validate()?;
        let renderer = self
            .stack_renderer
            .unwrap_or_else(|| Arc::new(WorkerStackRenderer::new()));
        Ok(RuntimeSettings::with_parts(self.default_config, renderer))
    }
}

impl Default for RuntimeSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogFormat, LogLevel};

    #[test]
    fn test_register_applies_default() {
        let runtime = RuntimeSettings::new();
        let root = Category::new("root", &runtime).unwrap();

        let settings = runtime.settings(&root).unwrap();
        assert_eq!(settings.log_level(), LogLevel::Error);
        assert_eq!(settings.logger_type(), LoggerType::Console);
        assert_eq!(runtime.category_count(), 1);

        // Registering again must not overwrite
        runtime
            .modify_settings(&root, |s| {
                s.set_log_level(LogLevel::Trace);
                Ok(())
            })
            .unwrap();
        runtime.register(&root);
        assert_eq!(runtime.settings(&root).unwrap().log_level(), LogLevel::Trace);
    }

    #[test]
    fn test_default_without_reset_only_affects_new_categories() {
        let runtime = RuntimeSettings::new();
        let before = Category::new("before", &runtime).unwrap();

        runtime
            .set_default_configuration(CategoryConfiguration::new(LogLevel::Debug), false)
            .unwrap();
        let after = Category::new("after", &runtime).unwrap();

        assert_eq!(runtime.settings(&before).unwrap().log_level(), LogLevel::Error);
        assert_eq!(runtime.settings(&after).unwrap().log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_default_with_reset_gives_each_category_its_own_copy() {
        let runtime = RuntimeSettings::new();
        let a = Category::new("a", &runtime).unwrap();
        let b = Category::new("b", &runtime).unwrap();

        runtime
            .set_default_configuration(CategoryConfiguration::new(LogLevel::Info), true)
            .unwrap();
        runtime
            .modify_settings(&a, |s| {
                s.set_log_level(LogLevel::Trace);
                Ok(())
            })
            .unwrap();

        assert_eq!(runtime.settings(&a).unwrap().log_level(), LogLevel::Trace);
        assert_eq!(runtime.settings(&b).unwrap().log_level(), LogLevel::Info);
    }

    #[test]
    fn test_override_subtree_and_inheritance() {
        let runtime = RuntimeSettings::new();
        let root = Category::new("root", &runtime).unwrap();
        let mid = root.child("mid").unwrap();
        let leaf = mid.child("leaf").unwrap();
        let sibling = root.child("sibling").unwrap();

        runtime
            .set_configuration_for_category(CategoryConfiguration::new(LogLevel::Debug), &mid, true, false)
            .unwrap();

        assert_eq!(runtime.settings(&mid).unwrap().log_level(), LogLevel::Debug);
        assert_eq!(runtime.settings(&leaf).unwrap().log_level(), LogLevel::Debug);
        assert_eq!(runtime.settings(&sibling).unwrap().log_level(), LogLevel::Error);
        assert_eq!(runtime.settings(&root).unwrap().log_level(), LogLevel::Error);

        let late = mid.child("late").unwrap();
        let late_settings = runtime.settings(&late).unwrap();
        assert_eq!(late_settings.log_level(), LogLevel::Debug);
        assert_eq!(late_settings.category_path(), "root#mid#late");
    }

    #[test]
    fn test_override_without_children() {
        let runtime = RuntimeSettings::new();
        let root = Category::new("root", &runtime).unwrap();
        let child = root.child("child").unwrap();

        runtime
            .set_configuration_for_category(CategoryConfiguration::new(LogLevel::Warn), &root, false, false)
            .unwrap();

        assert_eq!(runtime.settings(&root).unwrap().log_level(), LogLevel::Warn);
        assert_eq!(runtime.settings(&child).unwrap().log_level(), LogLevel::Error);
    }

    #[test]
    fn test_override_bound_root_does_not_fail() {
        let runtime = RuntimeSettings::new();
        let root = Category::new("root", &runtime).unwrap();
        let logger = runtime.logger(&root).unwrap();

        let result = runtime.set_configuration_for_category(
            CategoryConfiguration::new(LogLevel::Info),
            &root,
            true,
            false,
        );
        assert!(result.is_ok());
        assert!(Arc::ptr_eq(&logger, &runtime.logger(&root).unwrap()));
        assert_eq!(logger.current().logger_type(), LoggerType::Console);
    }

    #[test]
    fn test_modify_settings_rejects_invalid_edit() {
        let runtime = RuntimeSettings::new();
        let root = Category::new("root", &runtime).unwrap();

        let result = runtime.modify_settings(&root, |s| {
            s.set_log_level(LogLevel::Trace);
            Err(LoggerError::other("abort"))
        });

        assert!(result.is_err());
        assert_eq!(runtime.settings(&root).unwrap().log_level(), LogLevel::Error);
    }

    #[test]
    fn test_invalid_default_rejected() {
        let runtime = RuntimeSettings::new();
        let config = CategoryConfiguration::new(LogLevel::Info)
            .with_logger_type(LoggerType::Custom)
            .unwrap();

        assert!(runtime.set_default_configuration(config, true).is_err());
        assert_eq!(runtime.default_configuration().log_level(), LogLevel::Error);
    }

    #[test]
    fn test_clear() {
        let runtime = RuntimeSettings::new();
        let root = Category::new("root", &runtime).unwrap();
        runtime
            .set_default_configuration(
                CategoryConfiguration::new(LogLevel::Info).with_log_format(LogFormat::default()),
                true,
            )
            .unwrap();
        runtime.logger(&root).unwrap();

        runtime.clear();

        assert!(runtime.settings(&root).is_none());
        assert_eq!(runtime.category_count(), 0);
        assert_eq!(runtime.logger_count(), 0);
        assert_eq!(runtime.default_configuration().log_level(), LogLevel::Error);
        assert!(matches!(
            runtime.logger(&root),
            Err(LoggerError::CategoryNotRegistered { .. })
        ));
    }
}
