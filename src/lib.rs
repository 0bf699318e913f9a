//! # Rust Category Logger
//!
//! Hierarchical, category-scoped logging. Log statements are attached to
//! named categories arranged in a tree; level, format and sink are resolved
//! per category with inheritance from the default configuration or an
//! overridden ancestor.
//!
//! ## Features
//!
//! - **Category Tree**: per-category levels and formats, subtree overrides
//! - **Ordered Dispatch**: records reach the sink in submission order, even
//!   when an earlier record is still waiting for its error stack
//! - **Pluggable Sinks**: console, in-memory buffer, or custom appenders
//! - **Thread Safe**: registry and queues are safe to share across threads

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, MessageBuffer, MessageBufferAppender};
    pub use crate::core::{
        Appender, Category, CategoryConfiguration, CategoryLogger, CategorySettings, DateFormat,
        DateFormatEnum, InlineStackRenderer, LogData, LogFormat, LogLevel, LogMessage,
        LogPayload, LoggedError, LoggerDelegate, LoggerError, LoggerMetrics, LoggerType, Result,
        RuntimeSettings, StackCompletion, StackRenderer, WorkerStackRenderer,
    };
}

pub use appenders::{ConsoleAppender, MessageBuffer, MessageBufferAppender};
pub use core::{
    Appender, Category, CategoryConfiguration, CategoryLogger, CategorySettings, DateFormat,
    DateFormatEnum, InlineStackRenderer, LogData, LogFormat, LogLevel, LogMessage, LogPayload,
    LoggedError, LoggerDelegate, LoggerError, LoggerMetrics, LoggerType, Result, RuntimeSettings,
    StackCompletion, StackRenderer, WorkerStackRenderer, DEFAULT_SHUTDOWN_TIMEOUT,
};
