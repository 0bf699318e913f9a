//! Console appender implementation

use crate::core::{Appender, LogLevel, LogMessage, Result};
#[cfg(feature = "console")]
use colored::Colorize;

pub struct ConsoleAppender {
    #[cfg_attr(not(feature = "console"), allow(dead_code))]
    use_colors: bool,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self {
            use_colors: cfg!(feature = "console"),
        }
    }

    /// Colors only apply when the `console` feature is enabled
    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn format_line(&self, message: &LogMessage) -> String {
        let line = message.render();

        #[cfg(feature = "console")]
        if self.use_colors {
            return line.color(message.level().color_code()).to_string();
        }

        line
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, message: &LogMessage) -> Result<()> {
        let output = self.format_line(message);

        // Route Error and Fatal levels to stderr, others to stdout
        match message.level() {
            LogLevel::Error | LogLevel::Fatal => eprintln!("{}", output),
            _ => println!("{}", output),
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        use std::io::Write;
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
