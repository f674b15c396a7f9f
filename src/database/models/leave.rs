use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EmployeeRole, RequestStatus};

/// Company-scoped leave policy object. Changing one affects future
/// balance recomputation only; settled ledger rows are never touched.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveType {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub is_paid: bool,
    pub max_balance: Option<BigDecimal>,
    pub accrual_rate: BigDecimal,
    pub carryover_allowed: bool,
    pub carryover_max: Option<BigDecimal>,
    pub expires_after_months: i32,
    pub requires_attachment: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaveTypeInput {
    pub name: String,
    pub is_paid: bool,
    pub max_balance: Option<BigDecimal>,
    pub accrual_rate: BigDecimal,
    pub carryover_allowed: bool,
    pub carryover_max: Option<BigDecimal>,
    pub expires_after_months: i32,
    pub requires_attachment: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeaveTypeInput {
    pub name: Option<String>,
    pub is_paid: Option<bool>,
    pub max_balance: Option<BigDecimal>,
    pub accrual_rate: Option<BigDecimal>,
    pub carryover_allowed: Option<bool>,
    pub carryover_max: Option<BigDecimal>,
    pub expires_after_months: Option<i32>,
    pub requires_attachment: Option<bool>,
    pub is_active: Option<bool>,
}

/// One ledger row per (employee, leave type, period). `balance` is the
/// available figure net of `used`; it is derived unless manual-quota
/// mode marks the stored row authoritative.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalance {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type_id: Uuid,
    pub period_year: i32,
    pub period_month: i32,
    pub balance: BigDecimal,
    pub accrued: BigDecimal,
    pub used: BigDecimal,
    pub carried_over: BigDecimal,
    pub expired: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type_id: Uuid,
    pub company_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: BigDecimal,
    pub reason: Option<String>,
    pub attachment_url: Option<String>,
    pub requested_by: Uuid,
    pub requester_role: EmployeeRole,
    pub status: RequestStatus,
    pub rejection_reason: Option<String>,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaveRequestInput {
    pub employee_id: Uuid,
    pub leave_type_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub attachment_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeaveRequestInput {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub attachment_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualQuotaInput {
    pub employee_id: Uuid,
    pub leave_type_id: Uuid,
    pub period_year: i32,
    pub period_month: i32,
    pub balance: BigDecimal,
    pub used: Option<BigDecimal>,
}
