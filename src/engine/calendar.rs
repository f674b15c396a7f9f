use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Utc};

use crate::error::AppError;

/// Anchors every "day" boundary to the company's fixed operating
/// timezone. Callers may be anywhere; storage and comparison always
/// happen on the business-day calendar date.
#[derive(Debug, Clone, Copy)]
pub struct BusinessCalendar {
    offset: FixedOffset,
}

impl BusinessCalendar {
    pub fn new(offset_hours: i32) -> Self {
        let offset = FixedOffset::east_opt(offset_hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset"));
        Self { offset }
    }

    pub fn normalize_to_business_day(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Accepts a plain calendar date or an RFC 3339 instant; instants
    /// are normalized into the business zone first.
    pub fn parse_business_day(&self, raw: &str) -> Result<NaiveDate, AppError> {
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(date);
        }
        raw.parse::<DateTime<Utc>>()
            .map(|instant| self.normalize_to_business_day(instant))
            .map_err(|_| AppError::validation(format!("unparsable date: {}", raw)))
    }

    pub fn today_business_day(&self) -> NaiveDate {
        self.normalize_to_business_day(Utc::now())
    }

    /// Wall-clock time in the business zone, for schedule-window checks.
    pub fn local_time(&self, instant: DateTime<Utc>) -> NaiveTime {
        instant.with_timezone(&self.offset).time()
    }
}

/// 0 = Sunday .. 6 = Saturday.
pub fn day_of_week(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}
