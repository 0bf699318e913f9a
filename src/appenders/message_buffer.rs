//! In-memory message buffer appender

use crate::core::{Appender, LogMessage, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared handle to the rendered lines of a [`MessageBufferAppender`]
#[derive(Debug, Clone, Default)]
pub struct MessageBuffer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MessageBuffer {
    pub fn messages(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    /// Remove and return all buffered lines
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }

    fn push(&self, line: String) {
        self.lines.lock().push(line);
    }
}

/// Keeps every delivered message as a rendered line
///
/// # Example
///
/// ```
/// use rust_category_logger::appenders::MessageBufferAppender;
///
/// let appender = MessageBufferAppender::new();
/// let buffer = appender.buffer();
/// assert!(buffer.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct MessageBufferAppender {
    buffer: MessageBuffer,
}

impl MessageBufferAppender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> MessageBuffer {
        self.buffer.clone()
    }
}

impl Appender for MessageBufferAppender {
    fn append(&mut self, message: &LogMessage) -> Result<()> {
        self.buffer.push(message.render());
        Ok(())
    }

    fn name(&self) -> &str {
        "message_buffer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_empties_buffer() {
        let buffer = MessageBuffer::default();
        buffer.push("one".to_string());
        buffer.push("two".to_string());

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.take(), vec!["one", "two"]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_handles_share_lines() {
        let appender = MessageBufferAppender::new();
        let first = appender.buffer();
        let second = appender.buffer();

        first.push("shared".to_string());
        assert_eq!(second.messages(), vec!["shared"]);
    }
}
