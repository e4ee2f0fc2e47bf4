//! Date formatting for readers.
//!
//! Stored timestamps are UTC; readers see them in one configured timezone.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::{AppError, AppResult};

/// Formats timestamps as `dd/mm/yyyy` in a fixed timezone.
#[derive(Debug, Clone, Copy)]
pub struct DateFormatter {
    tz: Tz,
}

impl DateFormatter {
    /// Build a formatter from an IANA timezone name.
    pub fn new(timezone: &str) -> AppResult<Self> {
        let tz = timezone
            .parse::<Tz>()
            .map_err(|e| AppError::Config(format!("Unknown timezone {timezone}: {e}")))?;
        Ok(Self { tz })
    }

    /// Format a UTC timestamp as a calendar date in the configured timezone.
    #[must_use]
    pub fn format_date(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.tz).format("%d/%m/%Y").to_string()
    }

    /// Format a UTC timestamp as `dd/mm/yyyy hh:mm` (comment threads).
    #[must_use]
    pub fn format_date_time(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.tz).format("%d/%m/%Y %H:%M").to_string()
    }
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self {
            tz: chrono_tz::America::Sao_Paulo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_shifts_into_timezone() {
        let formatter = DateFormatter::default();
        // 02:00 UTC is still the previous day in Sao Paulo (UTC-3)
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 2, 0, 0).unwrap();
        assert_eq!(formatter.format_date(at), "29/02/2024");
        assert_eq!(formatter.format_date_time(at), "29/02/2024 23:00");
    }

    #[test]
    fn test_format_utc() {
        let formatter = DateFormatter::new("UTC").unwrap();
        let at = Utc.with_ymd_and_hms(2024, 12, 25, 12, 0, 0).unwrap();
        assert_eq!(formatter.format_date(at), "25/12/2024");
    }

    #[test]
    fn test_unknown_timezone_is_config_error() {
        assert!(matches!(
            DateFormatter::new("Mars/Olympus"),
            Err(AppError::Config(_))
        ));
    }
}
