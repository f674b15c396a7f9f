#![allow(dead_code)]

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use timekeeper::database::models::{
    AttendanceRecord, AttendanceStatus, Employee, EmployeeRole, EmploymentType, LeaveBalance,
    LeaveType, OvertimeCompensation, OvertimeRequest, RequestStatus,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn dec(s: &str) -> BigDecimal {
    s.parse().unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn employee(employment_type: EmploymentType) -> Employee {
    Employee {
        id: Uuid::new_v4(),
        company_id: Uuid::new_v4(),
        manager_id: None,
        name: "Binh Tran".to_string(),
        email: "binh@example.com".to_string(),
        role: EmployeeRole::Employee,
        employment_type,
        base_salary: Some(dec("3460000")),
        hourly_rate: Some(dec("25000")),
        daily_rate: Some(dec("200000")),
        health_insurance_enrolled: true,
        employment_insurance_enrolled: true,
        hire_date: Some(date(2024, 6, 1)),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn attendance_record(
    work_date: NaiveDate,
    status: AttendanceStatus,
    minutes: i64,
) -> AttendanceRecord {
    AttendanceRecord {
        id: Uuid::new_v4(),
        employee_id: Uuid::new_v4(),
        company_id: Uuid::new_v4(),
        work_date,
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

pub fn approved_overtime(
    work_date: NaiveDate,
    compensation: OvertimeCompensation,
    minutes: i64,
    amount: &str,
) -> OvertimeRequest {
    OvertimeRequest {
        id: Uuid::new_v4(),
        employee_id: Uuid::new_v4(),
        company_id: Uuid::new_v4(),
        work_date,
        duration_minutes: minutes,
        reason: Some("deployment window".to_string()),
        compensation,
        calculated_amount: dec(amount),
        requested_by: Uuid::new_v4(),
        requester_role: EmployeeRole::Employee,
        status: RequestStatus::Approved,
        rejection_reason: None,
        decided_by: Some(Uuid::new_v4()),
        decided_at: Some(Utc::now()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn leave_type(accrual: &str, max_balance: Option<&str>) -> LeaveType {
    LeaveType {
        id: Uuid::new_v4(),
        company_id: Uuid::new_v4(),
        name: "annual leave".to_string(),
        is_paid: true,
        max_balance: max_balance.map(dec),
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

pub fn balance_row(year: i32, month: i32, balance: &str, used: &str) -> LeaveBalance {
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
