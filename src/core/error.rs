//! Error types for the category logger

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Category name contains characters outside `[A-Za-z0-9_]`
    #[error("Invalid category name '{name}': only alphanumeric characters and '_' are allowed")]
    InvalidCategoryName { name: String },

    /// Settings lookup failed during a log call
    #[error("Category '{path}' is not registered with the runtime settings")]
    CategoryNotRegistered { path: String },

    /// A logger was requested for a category that has a parent
    #[error("Cannot get a logger for non-root category '{path}'")]
    NonRootCategoryLookup { path: String },

    /// A message formatter was set on a Custom logger configuration
    #[error("A message formatter cannot be combined with the Custom logger type")]
    ConflictingFormatterConfiguration,

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an invalid category name error
    pub fn invalid_name(name: impl Into<String>) -> Self {
        LoggerError::InvalidCategoryName { name: name.into() }
    }

    pub fn not_registered(path: impl Into<String>) -> Self {
        LoggerError::CategoryNotRegistered { path: path.into() }
    }

    pub fn non_root(path: impl Into<String>) -> Self {
        LoggerError::NonRootCategoryLookup { path: path.into() }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
