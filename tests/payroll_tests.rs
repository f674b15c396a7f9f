mod common;

use bigdecimal::BigDecimal;
use chrono::Utc;
use common::{approved_overtime, attendance_record, date, dec, employee};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use timekeeper::database::models::{
    AttendanceStatus, EmploymentType, OvertimeCompensation, PayrollItem, PayrollItemOverride,
};
use timekeeper::engine::payroll::{compute_pay, rederive_item_totals, ManualFigures, PayComputation};
use timekeeper::engine::policy::{ContributionBasis, ContributionScheme, PayrollConfig};

fn contribution_config() -> PayrollConfig {
    let mut config = PayrollConfig::default();
    config.health_insurance = ContributionScheme {
        enabled: true,
        basis: ContributionBasis::Percentage,
        employee_value: dec("1.5"),
        employer_value: dec("3"),
    };
    config.employment_insurance = ContributionScheme {
        enabled: true,
        basis: ContributionBasis::Fixed,
        employee_value: dec("20000"),
        employer_value: dec("40000"),
    };
    config.lunch_bonus = dec("300000");
    config
}

fn item_from(computation: &PayComputation) -> PayrollItem {
    PayrollItem {
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
        employee_employment_contribution: computation.employee_employment_contribution.clone(),
        employer_employment_contribution: computation.employer_employment_contribution.clone(),
        withholding: computation.withholding.clone(),
        gross_pay: computation.gross_pay.clone(),
        net_pay: computation.net_pay.clone(),
        breakdown: serde_json::to_value(&computation.breakdown).unwrap(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn net_pay_equals_gross_minus_employee_contributions_and_withholding() {
    common::init_logging();
    let worker = employee(EmploymentType::Monthly);
    let config = contribution_config();
    let records = vec![
        attendance_record(date(2026, 1, 6), AttendanceStatus::Present, 480),
        attendance_record(date(2026, 1, 7), AttendanceStatus::Present, 480),
    ];
    let overtime = vec![approved_overtime(
        date(2026, 1, 7),
        OvertimeCompensation::Payout,
        120,
        "60000",
    )];

    let result = compute_pay(&worker, &records, &overtime, &config, &ManualFigures::default());

    // 3,460,000 base + 60,000 overtime + 300,000 lunch bonus.
    assert_eq!(result.gross_pay, dec("3820000.00"));
    assert_eq!(result.employee_health_contribution, dec("51900.00"));
    assert_eq!(result.employee_employment_contribution, dec("20000.00"));
    assert_eq!(
        result.net_pay,
        &result.gross_pay
            - &result.employee_health_contribution
            - &result.employee_employment_contribution
            - &result.withholding
    );
    assert_eq!(result.net_pay, dec("3748100.00"));
}

#[test]
fn run_total_is_the_sum_of_item_nets() {
    let config = contribution_config();
    let workers = vec![
        employee(EmploymentType::Monthly),
        employee(EmploymentType::Hourly),
        employee(EmploymentType::Daily),
    ];
    let records = vec![
        attendance_record(date(2026, 1, 6), AttendanceStatus::Present, 480),
        attendance_record(date(2026, 1, 7), AttendanceStatus::HalfDay, 240),
    ];

    let computations: Vec<_> = workers
        .iter()
        .map(|w| compute_pay(w, &records, &[], &config, &ManualFigures::default()))
        .collect();

    let total: BigDecimal = computations.iter().map(|c| c.net_pay.clone()).sum();
    let by_hand: BigDecimal = computations
        .iter()
        .map(|c| {
            &c.gross_pay
                - &c.employee_health_contribution
                - &c.employee_employment_contribution
                - &c.withholding
        })
        .sum();
    assert_eq!(total, by_hand);
}

#[test]
fn hourly_and_daily_bases_follow_attendance_shape() {
    let config = PayrollConfig::default();
    let records = vec![
        attendance_record(date(2026, 1, 6), AttendanceStatus::Present, 480),
        attendance_record(date(2026, 1, 7), AttendanceStatus::HalfDay, 240),
        attendance_record(date(2026, 1, 8), AttendanceStatus::Absent, 0),
    ];

    let hourly = compute_pay(
        &employee(EmploymentType::Hourly),
        &records,
        &[],
        &config,
        &ManualFigures::default(),
    );
    // 12 hours at 25,000.
    assert_eq!(hourly.base_pay, dec("300000.00"));
    assert_eq!(hourly.breakdown.total_work_hours, dec("12.00"));

    let daily = compute_pay(
        &employee(EmploymentType::Daily),
        &records,
        &[],
        &config,
        &ManualFigures::default(),
    );
    // 1.5 day-units at 200,000.
    assert_eq!(daily.base_pay, dec("300000.00"));
    assert_eq!(daily.breakdown.present_days, 1);
    assert_eq!(daily.breakdown.half_days, 1);
}

#[test]
fn override_recomputes_totals_from_stored_figures() {
    let worker = employee(EmploymentType::Monthly);
    let config = contribution_config();
    let computation = compute_pay(&worker, &[], &[], &config, &ManualFigures::default());
    let item = item_from(&computation);

    let totals = rederive_item_totals(
        &item,
        &PayrollItemOverride {
            allowance: Some(dec("150000")),
            bonus: None,
            transport_bonus: None,
            lunch_bonus: None,
            holiday_bonus: None,
            deductions: Some(dec("50000")),
            withholding: Some(dec("80000")),
        },
    );

    assert_eq!(&totals.gross_pay, &(&item.gross_pay + dec("150000") - dec("50000")));
    assert_eq!(
        totals.net_pay,
        &totals.gross_pay
            - &item.employee_health_contribution
            - &item.employee_employment_contribution
            - &totals.withholding
    );
    // Untouched manual lines survive the override.
    assert_eq!(totals.bonus, item.bonus);
    assert_eq!(totals.lunch_bonus, item.lunch_bonus);
}

#[test]
fn time_in_lieu_never_reaches_pay() {
    let worker = employee(EmploymentType::Monthly);
    let overtime = vec![
        approved_overtime(date(2026, 1, 7), OvertimeCompensation::TimeOff, 180, "90000"),
    ];
    let result = compute_pay(
        &worker,
        &[],
        &overtime,
        &PayrollConfig::default(),
        &ManualFigures::default(),
    );
    assert_eq!(result.overtime_pay, dec("0.00"));
    assert_eq!(result.breakdown.overtime_hours, dec("3.00"));
}
