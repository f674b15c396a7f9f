use chrono::{DateTime, NaiveTime, Utc};

use super::policy::AttendanceRules;
use crate::database::models::AttendanceStatus;

/// Worked minutes for a clock pair. Negative spans (clock skew,
/// adjustment typos) floor at zero so no derived figure can ever
/// subtract pay.
pub fn compute_duration(
    clock_in: DateTime<Utc>,
    clock_out: DateTime<Utc>,
    rules: &AttendanceRules,
) -> i64 {
    let raw = (clock_out - clock_in).num_minutes();
    if raw <= 0 {
        return 0;
    }
    if rules.rounding_enabled && rules.rounding_interval_minutes > 0 {
        round_to_interval(raw, rules.rounding_interval_minutes)
    } else {
        raw
    }
}

/// Round-half-up to the nearest multiple of `interval`.
pub fn round_to_interval(minutes: i64, interval: i64) -> i64 {
    (minutes * 2 + interval) / (interval * 2) * interval
}

/// Minutes late against the expected start, 0 inside the grace period.
pub fn late_minutes(actual: NaiveTime, expected: NaiveTime, grace_minutes: i64) -> i64 {
    let diff = (actual - expected).num_minutes();
    if diff <= grace_minutes { 0 } else { diff }
}

/// Minutes left early against the expected end, 0 inside the grace period.
pub fn early_leave_minutes(actual: NaiveTime, expected_end: NaiveTime, grace_minutes: i64) -> i64 {
    let diff = (expected_end - actual).num_minutes();
    if diff <= grace_minutes { 0 } else { diff }
}

/// Settled status at clock-out. Short days settle as half days before
/// lateness is considered; a full day arrived late settles as late.
pub fn derive_status(worked_minutes: i64, late_minutes: i64, rules: &AttendanceRules) -> AttendanceStatus {
    if worked_minutes < rules.minimum_work_hours * 60 {
        AttendanceStatus::HalfDay
    } else if late_minutes > 0 {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    }
}
