use bigdecimal::{BigDecimal, RoundingMode};

use super::policy::{ContributionBasis, ContributionScheme, PayrollConfig};
use crate::database::models::{
    AttendanceRecord, AttendanceStatus, Employee, EmploymentType, OvertimeCompensation,
    OvertimeRequest, PayBreakdown, PayrollItem, PayrollItemOverride,
};

/// Manually entered per-item figures; everything else is derived.
#[derive(Debug, Clone, Default)]
pub struct ManualFigures {
    pub allowance: BigDecimal,
    pub bonus: BigDecimal,
    pub deductions: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct PayComputation {
    pub base_pay: BigDecimal,
    pub overtime_pay: BigDecimal,
    pub allowance: BigDecimal,
    pub bonus: BigDecimal,
    pub transport_bonus: BigDecimal,
    pub lunch_bonus: BigDecimal,
    pub holiday_bonus: BigDecimal,
    pub deductions: BigDecimal,
    pub employee_health_contribution: BigDecimal,
    pub employer_health_contribution: BigDecimal,
    pub employee_employment_contribution: BigDecimal,
    pub employer_employment_contribution: BigDecimal,
    pub withholding: BigDecimal,
    pub gross_pay: BigDecimal,
    pub net_pay: BigDecimal,
    pub breakdown: PayBreakdown,
}

/// Recomputed manual fields and totals after a single-item override.
#[derive(Debug, Clone)]
pub struct OverriddenTotals {
    pub allowance: BigDecimal,
    pub bonus: BigDecimal,
    pub transport_bonus: BigDecimal,
    pub lunch_bonus: BigDecimal,
    pub holiday_bonus: BigDecimal,
    pub deductions: BigDecimal,
    pub withholding: BigDecimal,
    pub gross_pay: BigDecimal,
    pub net_pay: BigDecimal,
}

/// Persisted duration wins; a live clock diff covers records settled
/// before duration persistence existed.
pub fn worked_minutes(record: &AttendanceRecord) -> i64 {
    if let Some(duration) = record.work_duration_minutes {
        return duration.max(0);
    }
    match (record.clock_in, record.clock_out) {
        (Some(clock_in), Some(clock_out)) => (clock_out - clock_in).num_minutes().max(0),
        _ => 0,
    }
}

fn payable(record: &AttendanceRecord) -> bool {
    matches!(
        record.status,
        AttendanceStatus::Present | AttendanceStatus::HalfDay
    )
}

pub fn compute_base_pay(employee: &Employee, records: &[AttendanceRecord]) -> (BigDecimal, PayBreakdown) {
    let present_days = records
        .iter()
        .filter(|r| r.status == AttendanceStatus::Present)
        .count() as i64;
    let half_days = records
        .iter()
        .filter(|r| r.status == AttendanceStatus::HalfDay)
        .count() as i64;
    let total_minutes: i64 = records
        .iter()
        .filter(|r| payable(r))
        .map(worked_minutes)
        .sum();
    let total_hours = BigDecimal::from(total_minutes) / BigDecimal::from(60);

    let zero = BigDecimal::from(0);
    let base = match employee.employment_type {
        EmploymentType::Monthly => employee.base_salary.clone().unwrap_or_else(|| zero.clone()),
        EmploymentType::Hourly => {
            let rate = employee.hourly_rate.clone().unwrap_or_else(|| zero.clone());
            rate * &total_hours
        }
        EmploymentType::Daily => {
            let rate = employee.daily_rate.clone().unwrap_or_else(|| zero.clone());
            let day_units =
                BigDecimal::from(present_days) + BigDecimal::from(half_days) / BigDecimal::from(2);
            rate * day_units
        }
    };

    let breakdown = PayBreakdown {
        employment_type: Some(employee.employment_type),
        attendance_days: records.len() as i64,
        present_days,
        half_days,
        total_work_hours: total_hours.with_scale_round(2, RoundingMode::HalfUp),
        overtime_hours: BigDecimal::from(0),
    };

    (money(base), breakdown)
}

/// Payout-compensated requests contribute their frozen amounts;
/// time-in-lieu requests count toward hours only.
pub fn compute_overtime_pay(requests: &[OvertimeRequest]) -> (BigDecimal, BigDecimal) {
    let pay: BigDecimal = requests
        .iter()
        .filter(|r| r.compensation == OvertimeCompensation::Payout)
        .map(|r| r.calculated_amount.clone())
        .sum();
    let minutes: i64 = requests.iter().map(|r| r.duration_minutes.max(0)).sum();
    let hours = BigDecimal::from(minutes) / BigDecimal::from(60);
    (money(pay), hours.with_scale_round(2, RoundingMode::HalfUp))
}

/// One statutory scheme split into (employee, employer) portions. The
/// employee side applies only to enrolled employees.
pub fn compute_contribution(
    scheme: &ContributionScheme,
    base: &BigDecimal,
    enrolled: bool,
) -> (BigDecimal, BigDecimal) {
    let zero = BigDecimal::from(0);
    if !scheme.enabled {
        return (zero.clone(), zero);
    }
    let hundred = BigDecimal::from(100);
    let (employee, employer) = match scheme.basis {
        ContributionBasis::Percentage => (
            base * &scheme.employee_value / &hundred,
            base * &scheme.employer_value / &hundred,
        ),
        ContributionBasis::Fixed => (scheme.employee_value.clone(), scheme.employer_value.clone()),
    };
    let employee = if enrolled { employee } else { zero };
    (money(employee), money(employer))
}

pub fn compute_pay(
    employee: &Employee,
    records: &[AttendanceRecord],
    overtime_requests: &[OvertimeRequest],
    config: &PayrollConfig,
    manual: &ManualFigures,
) -> PayComputation {
    let (base_pay, mut breakdown) = compute_base_pay(employee, records);
    let (overtime_pay, overtime_hours) = compute_overtime_pay(overtime_requests);
    breakdown.overtime_hours = overtime_hours;

    let allowance = money(manual.allowance.clone());
    let bonus = money(manual.bonus.clone());
    let transport_bonus = money(config.transport_bonus.clone());
    let lunch_bonus = money(config.lunch_bonus.clone());
    let holiday_bonus = money(config.holiday_bonus.clone());
    let deductions = money(manual.deductions.clone());

    let gross_pay = money(
        &base_pay + &overtime_pay + &allowance + &bonus + &transport_bonus + &lunch_bonus
            + &holiday_bonus
            - &deductions,
    );

    let (employee_health_contribution, employer_health_contribution) = compute_contribution(
        &config.health_insurance,
        &base_pay,
        employee.health_insurance_enrolled,
    );
    let (employee_employment_contribution, employer_employment_contribution) =
        compute_contribution(
            &config.employment_insurance,
            &base_pay,
            employee.employment_insurance_enrolled,
        );

    // Income-tax withholding is a manual-override placeholder; the
    // engine itself always derives zero.
    let withholding = money(BigDecimal::from(0));

    let net_pay = money(
        &gross_pay - &employee_health_contribution - &employee_employment_contribution
            - &withholding,
    );

    PayComputation {
        base_pay,
        overtime_pay,
        allowance,
        bonus,
        transport_bonus,
        lunch_bonus,
        holiday_bonus,
        deductions,
        employee_health_contribution,
        employer_health_contribution,
        employee_employment_contribution,
        employer_employment_contribution,
        withholding,
        gross_pay,
        net_pay,
        breakdown,
    }
}

/// Re-derives gross/net after a manual override from the item's stored
/// base/overtime/contribution figures, never from scratch.
pub fn rederive_item_totals(item: &PayrollItem, ov: &PayrollItemOverride) -> OverriddenTotals {
    let allowance = money(ov.allowance.clone().unwrap_or_else(|| item.allowance.clone()));
    let bonus = money(ov.bonus.clone().unwrap_or_else(|| item.bonus.clone()));
    let transport_bonus = money(
        ov.transport_bonus
            .clone()
            .unwrap_or_else(|| item.transport_bonus.clone()),
    );
    let lunch_bonus = money(ov.lunch_bonus.clone().unwrap_or_else(|| item.lunch_bonus.clone()));
    let holiday_bonus = money(
        ov.holiday_bonus
            .clone()
            .unwrap_or_else(|| item.holiday_bonus.clone()),
    );
    let deductions = money(ov.deductions.clone().unwrap_or_else(|| item.deductions.clone()));
    let withholding = money(ov.withholding.clone().unwrap_or_else(|| item.withholding.clone()));

    let gross_pay = money(
        &item.base_pay + &item.overtime_pay + &allowance + &bonus + &transport_bonus
            + &lunch_bonus
            + &holiday_bonus
            - &deductions,
    );
    let net_pay = money(
        &gross_pay
            - &item.employee_health_contribution
            - &item.employee_employment_contribution
            - &withholding,
    );

    OverriddenTotals {
        allowance,
        bonus,
        transport_bonus,
        lunch_bonus,
        holiday_bonus,
        deductions,
        withholding,
        gross_pay,
        net_pay,
    }
}

fn money(amount: BigDecimal) -> BigDecimal {
    amount.with_scale_round(2, RoundingMode::HalfUp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{EmployeeRole, RequestStatus};
    use chrono::{NaiveDate, Utc};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    fn employee(employment_type: EmploymentType) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            manager_id: None,
            name: "test".to_string(),
            email: "test@example.com".to_string(),
            role: EmployeeRole::Employee,
            employment_type,
            base_salary: Some(dec("5000000")),
            hourly_rate: Some(dec("30000")),
            daily_rate: Some(dec("250000")),
            health_insurance_enrolled: true,
            employment_insurance_enrolled: true,
            hire_date: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn record(status: AttendanceStatus, minutes: i64) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            work_date: NaiveDate::from_ymd_opt(2026, 1, 7).unwrap(),
            clock_in: None,
            clock_out: None,
            clock_in_lat: None,
            clock_in_lng: None,
            clock_out_lat: None,
            clock_out_lng: None,
            work_duration_minutes: Some(minutes),
            status,
            notes: None,
            adjustment_request_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn overtime(compensation: OvertimeCompensation, minutes: i64, amount: &str) -> OvertimeRequest {
        OvertimeRequest {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            work_date: NaiveDate::from_ymd_opt(2026, 1, 7).unwrap(),
            duration_minutes: minutes,
            reason: None,
            compensation,
            calculated_amount: dec(amount),
            requested_by: Uuid::new_v4(),
            requester_role: EmployeeRole::Employee,
            status: RequestStatus::Approved,
            rejection_reason: None,
            decided_by: None,
            decided_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn monthly_base_is_flat_salary() {
        let (base, _) = compute_base_pay(&employee(EmploymentType::Monthly), &[]);
        assert_eq!(base, dec("5000000.00"));
    }

    #[test]
    fn hourly_base_counts_present_and_half_days_only() {
        let records = vec![
            record(AttendanceStatus::Present, 480),
            record(AttendanceStatus::HalfDay, 240),
            record(AttendanceStatus::Late, 480),
            record(AttendanceStatus::Absent, 0),
        ];
        let (base, breakdown) = compute_base_pay(&employee(EmploymentType::Hourly), &records);
        // (480 + 240) minutes = 12 hours at 30,000.
        assert_eq!(base, dec("360000.00"));
        assert_eq!(breakdown.present_days, 1);
        assert_eq!(breakdown.half_days, 1);
        assert_eq!(breakdown.attendance_days, 4);
        assert_eq!(breakdown.total_work_hours, dec("12.00"));
    }

    #[test]
    fn hourly_base_falls_back_to_live_clock_diff() {
        let mut r = record(AttendanceStatus::Present, 0);
        r.work_duration_minutes = None;
        r.clock_in = Some("2026-01-07T02:00:00Z".parse().unwrap());
        r.clock_out = Some("2026-01-07T10:00:00Z".parse().unwrap());
        let (base, _) = compute_base_pay(&employee(EmploymentType::Hourly), &[r]);
        assert_eq!(base, dec("240000.00"));
    }

    #[test]
    fn daily_base_weights_half_days() {
        let records = vec![
            record(AttendanceStatus::Present, 480),
            record(AttendanceStatus::Present, 480),
            record(AttendanceStatus::HalfDay, 240),
        ];
        let (base, _) = compute_base_pay(&employee(EmploymentType::Daily), &records);
        // 2.5 day-units at 250,000.
        assert_eq!(base, dec("625000.00"));
    }

    #[test]
    fn time_in_lieu_overtime_contributes_no_pay() {
        let requests = vec![
            overtime(OvertimeCompensation::Payout, 120, "60000"),
            overtime(OvertimeCompensation::TimeOff, 60, "30000"),
        ];
        let (pay, hours) = compute_overtime_pay(&requests);
        assert_eq!(pay, dec("60000.00"));
        assert_eq!(hours, dec("3.00"));
    }

    #[test]
    fn percentage_contribution_splits_sides() {
        let scheme = ContributionScheme {
            enabled: true,
            basis: ContributionBasis::Percentage,
            employee_value: dec("1.5"),
            employer_value: dec("3"),
        };
        let base = dec("5000000");
        let (employee_side, employer_side) = compute_contribution(&scheme, &base, true);
        assert_eq!(employee_side, dec("75000.00"));
        assert_eq!(employer_side, dec("150000.00"));
    }

    #[test]
    fn unenrolled_employee_pays_no_contribution() {
        let scheme = ContributionScheme {
            enabled: true,
            basis: ContributionBasis::Fixed,
            employee_value: dec("50000"),
            employer_value: dec("100000"),
        };
        let (employee_side, employer_side) = compute_contribution(&scheme, &dec("5000000"), false);
        assert_eq!(employee_side, dec("0.00"));
        assert_eq!(employer_side, dec("100000.00"));
    }

    #[test]
    fn net_pay_round_trip() {
        let mut config = PayrollConfig::default();
        config.health_insurance = ContributionScheme {
            enabled: true,
            basis: ContributionBasis::Percentage,
            employee_value: dec("1.5"),
            employer_value: dec("3"),
        };
        config.lunch_bonus = dec("300000");
        let manual = ManualFigures {
            allowance: dec("200000"),
            bonus: dec("0"),
            deductions: dec("100000"),
        };
        let requests = vec![overtime(OvertimeCompensation::Payout, 120, "60000")];
        let result = compute_pay(
            &employee(EmploymentType::Monthly),
            &[],
            &requests,
            &config,
            &manual,
        );

        assert_eq!(
            result.gross_pay,
            dec("5460000.00") // 5,000,000 + 60,000 + 200,000 + 300,000 - 100,000
        );
        assert_eq!(result.employee_health_contribution, dec("75000.00"));
        assert_eq!(
            result.net_pay,
            &result.gross_pay
                - &result.employee_health_contribution
                - &result.employee_employment_contribution
                - &result.withholding
        );
        assert_eq!(result.withholding, dec("0.00"));
    }

    #[test]
    fn override_rederives_from_stored_figures() {
        let manual = ManualFigures::default();
        let computation = compute_pay(
            &employee(EmploymentType::Monthly),
            &[],
            &[],
            &PayrollConfig::default(),
            &manual,
        );
        let item = PayrollItem {
            id: Uuid::new_v4(),
            payroll_run_id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            base_pay: computation.base_pay.clone(),
            overtime_pay: computation.overtime_pay.clone(),
            allowance: computation.allowance.clone(),
            bonus: computation.bonus.clone(),
            transport_bonus: computation.transport_bonus.clone(),
            lunch_bonus: computation.lunch_bonus.clone(),
            holiday_bonus: computation.holiday_bonus.clone(),
            deductions: computation.deductions.clone(),
            employee_health_contribution: computation.employee_health_contribution.clone(),
            employer_health_contribution: computation.employer_health_contribution.clone(),
            employee_employment_contribution: computation
                .employee_employment_contribution
                .clone(),
            employer_employment_contribution: computation
                .employer_employment_contribution
                .clone(),
            withholding: computation.withholding.clone(),
            gross_pay: computation.gross_pay.clone(),
            net_pay: computation.net_pay.clone(),
            breakdown: serde_json::to_value(&computation.breakdown).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let totals = rederive_item_totals(
            &item,
            &PayrollItemOverride {
                allowance: Some(dec("500000")),
                bonus: None,
                transport_bonus: None,
                lunch_bonus: None,
                holiday_bonus: None,
                deductions: None,
                withholding: Some(dec("120000")),
            },
        );

        assert_eq!(totals.gross_pay, dec("5500000.00"));
        assert_eq!(totals.net_pay, dec("5380000.00"));
        assert_eq!(totals.bonus, item.bonus);
    }
}
