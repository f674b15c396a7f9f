use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EmploymentType;
use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum PayrollRunStatus {
        Draft => "draft",
        Processing => "processing",
        Locked => "locked",
        Paid => "paid",
    }
}

impl PayrollRunStatus {
    /// Locked and paid runs are immutable and undeletable.
    pub fn is_mutable(&self) -> bool {
        matches!(self, PayrollRunStatus::Draft | PayrollRunStatus::Processing)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRun {
    pub id: Uuid,
    pub company_id: Uuid,
    pub period_year: i32,
    pub period_month: i32,
    pub status: PayrollRunStatus,
    pub total_amount: BigDecimal,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Frozen snapshot of one employee's pay within a run. Owned by the
/// run; deleted with it, never independently.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PayrollItem {
    pub id: Uuid,
    pub payroll_run_id: Uuid,
    pub employee_id: Uuid,
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
    pub breakdown: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Audit/display record embedded in each item as JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayBreakdown {
    pub employment_type: Option<EmploymentType>,
    pub attendance_days: i64,
    pub present_days: i64,
    pub half_days: i64,
    pub total_work_hours: BigDecimal,
    pub overtime_hours: BigDecimal,
}

/// Manual overrides for a single item. Base, overtime and contribution
/// figures are never overridden; gross/net re-derive from the stored
/// values of those.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollItemOverride {
    pub allowance: Option<BigDecimal>,
    pub bonus: Option<BigDecimal>,
    pub transport_bonus: Option<BigDecimal>,
    pub lunch_bonus: Option<BigDecimal>,
    pub holiday_bonus: Option<BigDecimal>,
    pub deductions: Option<BigDecimal>,
    pub withholding: Option<BigDecimal>,
}
