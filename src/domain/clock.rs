use std::fmt::Formatter;

use chrono::{NaiveDateTime, Timelike};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Wall-clock time a record was written at, rendered as `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubmissionTimestamp(NaiveDateTime);

impl SubmissionTimestamp {
    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }
}

impl From<NaiveDateTime> for SubmissionTimestamp {
    fn from(value: NaiveDateTime) -> Self {
        // Sub-second precision is not representable in the column format
        let value = value.with_nanosecond(0).unwrap_or(value);
        SubmissionTimestamp(value)
    }
}

impl std::fmt::Display for SubmissionTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> SubmissionTimestamp;
}

/// Local wall-clock time of the machine doing the submission.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SubmissionTimestamp {
        chrono::Local::now().naive_local().into()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub SubmissionTimestamp);

impl Clock for FixedClock {
    fn now(&self) -> SubmissionTimestamp {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_display_uses_column_format() {
        let timestamp: SubmissionTimestamp = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|date| date.and_hms_opt(9, 5, 0))
            .unwrap()
            .into();
        assert_eq!(timestamp.to_string(), "2024-03-01 09:05:00");
    }

    #[test]
    fn test_sub_second_precision_is_dropped() {
        let timestamp: SubmissionTimestamp = NaiveDate::from_ymd_opt(2023, 12, 31)
            .and_then(|date| date.and_hms_milli_opt(23, 59, 59, 999))
            .unwrap()
            .into();
        assert_eq!(timestamp.to_string(), "2023-12-31 23:59:59");
        assert_eq!(timestamp.as_naive().nanosecond(), 0);
    }

    #[test]
    fn test_system_clock_matches_format() {
        let rendered = SystemClock.now().to_string();
        assert_eq!(rendered.len(), "YYYY-MM-DD HH:MM:SS".len());
        assert!(NaiveDateTime::parse_from_str(&rendered, TIMESTAMP_FORMAT).is_ok());
    }
}
