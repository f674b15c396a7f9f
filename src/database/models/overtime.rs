use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;
use super::{EmployeeRole, RequestStatus};

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum OvertimeCompensation {
        Payout => "payout",
        TimeOff => "time_off",
    }
}

/// `calculated_amount` at creation is a preview; the figure is frozen
/// at approval using the policy live at that moment.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub company_id: Uuid,
    pub work_date: NaiveDate,
    pub duration_minutes: i64,
    pub reason: Option<String>,
    pub compensation: OvertimeCompensation,
    pub calculated_amount: BigDecimal,
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
pub struct CreateOvertimeRequestInput {
    pub employee_id: Uuid,
    pub work_date: NaiveDate,
    pub duration_minutes: i64,
    pub reason: Option<String>,
    pub compensation: OvertimeCompensation,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOvertimeRequestInput {
    pub work_date: NaiveDate,
    pub duration_minutes: i64,
    pub reason: Option<String>,
    pub compensation: OvertimeCompensation,
}
