//! Date and line format configuration
//!
//! A [`LogFormat`] controls what the default rendering of a log message shows:
//! the capture timestamp (formatted per [`DateFormat`]) and the category names.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Predefined date layouts
///
/// The date separator of a [`DateFormat`] is placed between the date parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFormatEnum {
    /// `2025-01-08 10:30:45,123`
    #[default]
    Default,

    /// `2025-01-08 10:30:45`
    YearMonthDayTime,

    /// `2025-08-01 10:30:45,123`
    YearDayMonthWithFullTime,

    /// `2025-08-01 10:30:45`
    YearDayMonthTime,
}

/// Date layout plus the separator used between year, month and day
///
/// # Examples
///
/// ```
/// use rust_category_logger::core::{DateFormat, DateFormatEnum};
/// use chrono::{Local, TimeZone};
///
/// let date = Local.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// let format = DateFormat::new(DateFormatEnum::YearMonthDayTime, "/");
/// assert_eq!(format.format(&date), "2025/01/08 10:30:45");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFormat {
    pub format: DateFormatEnum,
    pub date_separator: String,
}

impl DateFormat {
    pub fn new(format: DateFormatEnum, date_separator: impl Into<String>) -> Self {
        Self {
            format,
            date_separator: date_separator.into(),
        }
    }

    /// strftime pattern for this layout
    fn pattern(&self) -> String {
        // A literal '%' in the separator must not start a specifier
        let sep = self.date_separator.replace('%', "%%");
        match self.format {
            DateFormatEnum::Default => format!("%Y{sep}%m{sep}%d %H:%M:%S,%3f"),
            DateFormatEnum::YearMonthDayTime => format!("%Y{sep}%m{sep}%d %H:%M:%S"),
            DateFormatEnum::YearDayMonthWithFullTime => format!("%Y{sep}%d{sep}%m %H:%M:%S,%3f"),
            DateFormatEnum::YearDayMonthTime => format!("%Y{sep}%d{sep}%m %H:%M:%S"),
        }
    }

    #[must_use]
    pub fn format(&self, datetime: &DateTime<Local>) -> String {
        datetime.format(&self.pattern()).to_string()
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self::new(DateFormatEnum::Default, "-")
    }
}

/// What the default message rendering includes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogFormat {
    pub show_category_name: bool,
    pub show_timestamp: bool,
    pub date_format: DateFormat,
}

impl LogFormat {
    pub fn new(show_category_name: bool, show_timestamp: bool, date_format: DateFormat) -> Self {
        Self {
            show_category_name,
            show_timestamp,
            date_format,
        }
    }
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::new(true, true, DateFormat::default())
    }
}
