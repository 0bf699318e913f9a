//! Appender trait for log sinks

use super::{error::Result, log_message::LogMessage};

/// Consumer of ready log messages. Messages arrive in submission order.
pub trait Appender: Send + Sync {
    fn append(&mut self, message: &LogMessage) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}
