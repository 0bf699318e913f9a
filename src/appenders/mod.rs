//! Appender implementations

pub mod console;
pub mod message_buffer;

pub use console::ConsoleAppender;
pub use message_buffer::{MessageBuffer, MessageBufferAppender};

// Re-export the trait so custom sinks only need this module
pub use crate::core::Appender;
