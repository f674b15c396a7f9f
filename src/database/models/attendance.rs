use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;
use super::{EmployeeRole, RequestStatus};

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum AttendanceStatus {
        Present => "present",
        Absent => "absent",
        Late => "late",
        HalfDay => "half_day",
        OnLeave => "on_leave",
    }
}

/// One row per (employee, business day). `work_date` is always the
/// company-timezone day, never the caller's local date.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub company_id: Uuid,
    pub work_date: NaiveDate,
    pub clock_in: Option<DateTime<Utc>>,
    pub clock_out: Option<DateTime<Utc>>,
    pub clock_in_lat: Option<f64>,
    pub clock_in_lng: Option<f64>,
    pub clock_out_lat: Option<f64>,
    pub clock_out_lng: Option<f64>,
    pub work_duration_minutes: Option<i64>,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    pub adjustment_request_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockInput {
    pub employee_id: Uuid,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: Option<String>,
}

/// Proposes replacement clock times for one attendance record. The
/// requester's role is frozen at submission; the escalation rule keys
/// off who originally asked, not who holds the role today.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentRequest {
    pub id: Uuid,
    pub attendance_record_id: Uuid,
    pub employee_id: Uuid,
    pub company_id: Uuid,
    pub requested_clock_in: DateTime<Utc>,
    pub requested_clock_out: DateTime<Utc>,
    pub reason: String,
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
pub struct AdjustmentInput {
    pub attendance_record_id: Uuid,
    pub requested_clock_in: DateTime<Utc>,
    pub requested_clock_out: DateTime<Utc>,
    pub reason: String,
}
