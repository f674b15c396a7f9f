use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use super::calendar::day_of_week;
use super::policy::LeavePolicy;
use crate::database::models::{LeaveBalance, LeaveType};

/// Stand-in cap when a quota-mode leave type has no max balance.
pub const UNLIMITED_BALANCE: i64 = 99_999;

/// Derived figures for one (employee, leave type, period) row. `used`
/// is carried through untouched; only approvals and the manual-quota
/// setter may change it.
#[derive(Debug, Clone, PartialEq)]
pub struct AccrualOutcome {
    pub balance: BigDecimal,
    pub accrued: BigDecimal,
    pub used: BigDecimal,
    pub carried_over: BigDecimal,
    pub expired: BigDecimal,
}

/// Whole months elapsed between two (year, month) periods.
pub fn months_between(from_year: i32, from_month: i32, to_year: i32, to_month: i32) -> i32 {
    (to_year - from_year) * 12 + (to_month - from_month)
}

/// Recomputes a period's balance from the prior period's stored row.
/// Pure and idempotent: the same inputs always produce the same
/// outcome, so lazy re-reads never drift.
pub fn accrue_period(
    leave_type: &LeaveType,
    policy: &LeavePolicy,
    previous: Option<&LeaveBalance>,
    reference: Option<&LeaveBalance>,
    existing_used: BigDecimal,
    target_year: i32,
    target_month: u32,
) -> AccrualOutcome {
    let zero = BigDecimal::from(0);

    if !policy.accrual_enabled {
        // Quota mode: the cap is the entitlement, nothing accrues.
        let cap = leave_type
            .max_balance
            .clone()
            .unwrap_or_else(|| BigDecimal::from(UNLIMITED_BALANCE));
        return AccrualOutcome {
            balance: cap - &existing_used,
            accrued: zero.clone(),
            used: existing_used,
            carried_over: zero.clone(),
            expired: zero,
        };
    }

    let accrued = leave_type.accrual_rate.clone();
    let previous_balance = previous.map(|b| b.balance.clone()).unwrap_or_else(|| zero.clone());

    let mut new_balance = &previous_balance + &accrued;
    if let Some(cap) = &leave_type.max_balance {
        if &new_balance > cap {
            new_balance = cap.clone();
        }
    }

    let carried_over = if target_month == policy.carryover_month && leave_type.carryover_allowed {
        reference
            .map(|r| {
                let candidate = r.balance.clone();
                let candidate = if candidate < zero { zero.clone() } else { candidate };
                match &leave_type.carryover_max {
                    Some(max) if &candidate > max => max.clone(),
                    _ => candidate,
                }
            })
            .unwrap_or_else(|| zero.clone())
    } else {
        zero.clone()
    };

    // All-or-nothing: the whole previous balance lapses once the
    // threshold is reached, no pro-rating of individual accrual lots.
    let expired = match previous {
        Some(prev) if leave_type.expires_after_months > 0 => {
            let elapsed = months_between(
                prev.period_year,
                prev.period_month,
                target_year,
                target_month as i32,
            );
            if elapsed >= leave_type.expires_after_months {
                previous_balance.clone()
            } else {
                zero.clone()
            }
        }
        _ => zero.clone(),
    };

    let balance = new_balance + &carried_over - &expired - &existing_used;

    AccrualOutcome {
        balance,
        accrued,
        used: existing_used,
        carried_over,
        expired,
    }
}

/// Inclusive day count of [start, end], skipping the policy's
/// non-working weekday.
pub fn count_leave_days(start: NaiveDate, end: NaiveDate, policy: &LeavePolicy) -> i64 {
    let mut days = 0;
    let mut cursor = start;
    while cursor <= end {
        if day_of_week(cursor) != policy.non_working_weekday {
            days += 1;
        }
        cursor = match cursor.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    days
}

/// Closed-interval overlap.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    fn leave_type(accrual: &str, max: Option<&str>) -> LeaveType {
        LeaveType {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "annual".to_string(),
            is_paid: true,
            max_balance: max.map(dec),
            accrual_rate: dec(accrual),
            carryover_allowed: false,
            carryover_max: None,
            expires_after_months: 0,
            requires_attachment: false,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn balance_row(year: i32, month: i32, balance: &str, used: &str) -> LeaveBalance {
        LeaveBalance {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            leave_type_id: Uuid::new_v4(),
            period_year: year,
            period_month: month,
            balance: dec(balance),
            accrued: dec("0"),
            used: dec(used),
            carried_over: dec("0"),
            expired: dec("0"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn first_period_accrues_from_zero() {
        let lt = leave_type("1", None);
        let outcome = accrue_period(&lt, &LeavePolicy::default(), None, None, dec("0"), 2026, 3);
        assert_eq!(outcome.balance, dec("1"));
        assert_eq!(outcome.accrued, dec("1"));
        assert_eq!(outcome.carried_over, dec("0"));
        assert_eq!(outcome.expired, dec("0"));
    }

    #[test]
    fn accrual_caps_at_max_balance() {
        let lt = leave_type("1", Some("12"));
        let prev = balance_row(2026, 2, "12", "0");
        let outcome = accrue_period(&lt, &LeavePolicy::default(), Some(&prev), None, dec("0"), 2026, 3);
        assert_eq!(outcome.balance, dec("12"));
    }

    #[test]
    fn recomputation_is_idempotent() {
        let lt = leave_type("1.5", Some("20"));
        let prev = balance_row(2026, 2, "4.5", "1");
        let policy = LeavePolicy::default();
        let first = accrue_period(&lt, &policy, Some(&prev), None, dec("2"), 2026, 3);
        let second = accrue_period(&lt, &policy, Some(&prev), None, dec("2"), 2026, 3);
        assert_eq!(first, second);
        assert_eq!(first.used, dec("2"));
        // 4.5 + 1.5 accrued - 2 used
        assert_eq!(first.balance, dec("4.0"));
    }

    #[test]
    fn carryover_applies_only_in_carryover_month() {
        let mut lt = leave_type("1", None);
        lt.carryover_allowed = true;
        lt.carryover_max = Some(dec("5"));
        let policy = LeavePolicy::default();
        let reference = balance_row(2025, 12, "9", "0");

        let january = accrue_period(&lt, &policy, None, Some(&reference), dec("0"), 2026, 1);
        assert_eq!(january.carried_over, dec("5"));
        assert_eq!(january.balance, dec("6"));

        let february = accrue_period(&lt, &policy, None, Some(&reference), dec("0"), 2026, 2);
        assert_eq!(february.carried_over, dec("0"));
    }

    #[test]
    fn whole_previous_balance_expires_past_threshold() {
        let mut lt = leave_type("1", None);
        lt.expires_after_months = 6;
        let prev = balance_row(2025, 9, "4", "0");
        let outcome = accrue_period(&lt, &LeavePolicy::default(), Some(&prev), None, dec("0"), 2026, 3);
        assert_eq!(outcome.expired, dec("4"));
        // 4 + 1 accrued - 4 expired
        assert_eq!(outcome.balance, dec("1"));
    }

    #[test]
    fn expiry_needs_a_previous_balance() {
        let mut lt = leave_type("1", None);
        lt.expires_after_months = 6;
        let outcome = accrue_period(&lt, &LeavePolicy::default(), None, None, dec("0"), 2026, 3);
        assert_eq!(outcome.expired, dec("0"));
    }

    #[test]
    fn quota_mode_derives_from_cap_minus_used() {
        let lt = leave_type("1", Some("10"));
        let policy = LeavePolicy {
            accrual_enabled: false,
            ..LeavePolicy::default()
        };
        let outcome = accrue_period(&lt, &policy, None, None, dec("3"), 2026, 3);
        assert_eq!(outcome.balance, dec("7"));
        assert_eq!(outcome.accrued, dec("0"));

        let uncapped = leave_type("1", None);
        let outcome = accrue_period(&uncapped, &policy, None, None, dec("0"), 2026, 3);
        assert_eq!(outcome.balance, BigDecimal::from(UNLIMITED_BALANCE));
    }

    #[test]
    fn monday_to_monday_counts_seven_days() {
        // 2026-01-05 is a Monday; the span covers one Sunday.
        let start = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 1, 12).unwrap();
        assert_eq!(count_leave_days(start, end, &LeavePolicy::default()), 7);
    }

    #[test]
    fn single_day_counts_one_unless_non_working() {
        let policy = LeavePolicy::default();
        let monday = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(count_leave_days(monday, monday, &policy), 1);
        let sunday = NaiveDate::from_ymd_opt(2026, 1, 4).unwrap();
        assert_eq!(count_leave_days(sunday, sunday, &policy), 0);
    }

    #[test]
    fn overlap_detection_is_inclusive() {
        let d = |day| NaiveDate::from_ymd_opt(2026, 1, day).unwrap();
        assert!(ranges_overlap(d(5), d(10), d(8), d(12)));
        assert!(ranges_overlap(d(5), d(10), d(10), d(12)));
        assert!(!ranges_overlap(d(5), d(10), d(11), d(12)));
    }

    #[test]
    fn months_between_crosses_years() {
        assert_eq!(months_between(2025, 9, 2026, 3), 6);
        assert_eq!(months_between(2026, 3, 2026, 3), 0);
    }
}
