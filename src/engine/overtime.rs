use bigdecimal::{BigDecimal, RoundingMode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::calendar::day_of_week;
use super::policy::{DayClassRule, OvertimePolicy};
use crate::database::models::{Employee, EmploymentType};

/// Hours a monthly salary is spread over when deriving an hourly rate.
pub const STANDARD_MONTHLY_HOURS: i64 = 173;
pub const STANDARD_DAILY_HOURS: i64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayClass {
    Weekday,
    Weekend,
    Holiday,
}

/// Total and deterministic. Holiday wins outright; Saturday, Sunday
/// and the policy's non-working weekday settle at the weekend rate.
pub fn classify_day(date: NaiveDate, is_holiday: bool, policy: &OvertimePolicy) -> DayClass {
    if is_holiday {
        return DayClass::Holiday;
    }
    let dow = day_of_week(date);
    if dow == 0 || dow == 6 || dow == policy.non_working_weekday {
        DayClass::Weekend
    } else {
        DayClass::Weekday
    }
}

pub fn is_holiday(date: NaiveDate, policy: &OvertimePolicy) -> bool {
    policy.holidays.contains(&date)
}

/// Hourly-equivalent base rate, or None when the matching contract
/// rate is unset. Absence of a rate is a configuration gap upstream;
/// the pay calculators answer it with zero, never a fault.
pub fn hourly_equivalent(employee: &Employee) -> Option<BigDecimal> {
    match employee.employment_type {
        EmploymentType::Monthly => employee
            .base_salary
            .as_ref()
            .map(|salary| salary / BigDecimal::from(STANDARD_MONTHLY_HOURS)),
        EmploymentType::Hourly => employee.hourly_rate.clone(),
        EmploymentType::Daily => employee
            .daily_rate
            .as_ref()
            .map(|rate| rate / BigDecimal::from(STANDARD_DAILY_HOURS)),
    }
}

/// Overtime payout for one request under the given policy.
pub fn compute_pay(
    work_date: NaiveDate,
    duration_minutes: i64,
    employee: &Employee,
    policy: &OvertimePolicy,
    holiday: bool,
) -> BigDecimal {
    let rule = class_rule(classify_day(work_date, holiday, policy), policy);
    if !rule.enabled {
        return money(BigDecimal::from(0));
    }
    let Some(rate) = hourly_equivalent(employee) else {
        return money(BigDecimal::from(0));
    };

    let hours = BigDecimal::from(duration_minutes.max(0)) / BigDecimal::from(60);
    let hours = match &rule.cap_hours {
        Some(cap) if &hours > cap => cap.clone(),
        _ => hours,
    };

    let mut pay = rate * hours * &rule.multiplier;
    let zero = BigDecimal::from(0);
    if rule.minimum_payment > zero && pay < rule.minimum_payment {
        pay = rule.minimum_payment.clone();
    }
    money(pay)
}

fn class_rule(class: DayClass, policy: &OvertimePolicy) -> &DayClassRule {
    match class {
        DayClass::Weekday => &policy.weekday,
        DayClass::Weekend => &policy.weekend,
        DayClass::Holiday => &policy.holiday,
    }
}

fn money(amount: BigDecimal) -> BigDecimal {
    amount.with_scale_round(2, RoundingMode::HalfUp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::EmployeeRole;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    fn monthly_employee(salary: &str) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            manager_id: None,
            name: "test".to_string(),
            email: "test@example.com".to_string(),
            role: EmployeeRole::Employee,
            employment_type: EmploymentType::Monthly,
            base_salary: Some(dec(salary)),
            hourly_rate: None,
            daily_rate: None,
            health_insurance_enrolled: true,
            employment_insurance_enrolled: true,
            hire_date: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn weekday_classification_tuesday_through_friday() {
        let policy = OvertimePolicy::default();
        // 2026-01-06 is a Tuesday, 2026-01-09 a Friday
        for day in 6..=9 {
            let date = NaiveDate::from_ymd_opt(2026, 1, day).unwrap();
            assert_eq!(classify_day(date, false, &policy), DayClass::Weekday);
        }
    }

    #[test]
    fn monday_and_weekend_classify_as_weekend_rate() {
        let policy = OvertimePolicy::default();
        // Monday 2026-01-05, Saturday 2026-01-10, Sunday 2026-01-11
        for day in [5, 10, 11] {
            let date = NaiveDate::from_ymd_opt(2026, 1, day).unwrap();
            assert_eq!(classify_day(date, false, &policy), DayClass::Weekend);
        }
    }

    #[test]
    fn holiday_overrides_weekday() {
        let policy = OvertimePolicy::default();
        let date = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        assert_eq!(classify_day(date, true, &policy), DayClass::Holiday);
    }

    #[test]
    fn monthly_salary_divides_by_standard_hours() {
        let employee = monthly_employee("3460000");
        assert_eq!(hourly_equivalent(&employee).unwrap(), dec("20000"));
    }

    #[test]
    fn weekday_pay_matches_reference_example() {
        // 3,460,000 monthly, 2 hours on a weekday at x1.5 => 60,000.
        let employee = monthly_employee("3460000");
        let policy = OvertimePolicy::default();
        let date = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap(); // Wednesday
        let pay = compute_pay(date, 120, &employee, &policy, false);
        assert_eq!(pay, dec("60000.00"));
    }

    #[test]
    fn cap_limits_payable_hours() {
        let employee = monthly_employee("3460000");
        let mut policy = OvertimePolicy::default();
        policy.weekday.cap_hours = Some(dec("2"));
        let date = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        // 4 hours requested, 2 payable.
        let pay = compute_pay(date, 240, &employee, &policy, false);
        assert_eq!(pay, dec("60000.00"));
    }

    #[test]
    fn minimum_payment_floors_small_amounts() {
        let employee = monthly_employee("3460000");
        let mut policy = OvertimePolicy::default();
        policy.weekday.minimum_payment = dec("50000");
        let date = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        // 30 minutes at x1.5 would be 15,000; the floor lifts it.
        let pay = compute_pay(date, 30, &employee, &policy, false);
        assert_eq!(pay, dec("50000.00"));
    }

    #[test]
    fn disabled_rule_pays_zero() {
        let employee = monthly_employee("3460000");
        let mut policy = OvertimePolicy::default();
        policy.weekday.enabled = false;
        let date = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        assert_eq!(compute_pay(date, 120, &employee, &policy, false), dec("0.00"));
    }

    #[test]
    fn missing_rate_pays_zero_not_fault() {
        let mut employee = monthly_employee("3460000");
        employee.base_salary = None;
        let policy = OvertimePolicy::default();
        let date = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        assert_eq!(compute_pay(date, 120, &employee, &policy, false), dec("0.00"));
    }

    #[test]
    fn weekend_rate_applies_on_monday() {
        let employee = monthly_employee("3460000");
        let policy = OvertimePolicy::default();
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(); // Monday
        // 2 hours at x2.0 weekend rate.
        assert_eq!(compute_pay(date, 120, &employee, &policy, false), dec("80000.00"));
    }
}
