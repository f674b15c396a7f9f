use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum PolicyType {
        AttendanceRules => "attendance_rules",
        OvertimePolicy => "overtime_policy",
        LeavePolicy => "leave_policy",
        PayrollConfig => "payroll_config",
    }
}

/// Versioned company policy row. Only the highest-version active row
/// of each type applies; older versions are kept for the record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPolicy {
    pub id: Uuid,
    pub company_id: Uuid,
    pub policy_type: PolicyType,
    pub version: i32,
    pub is_active: bool,
    pub config: serde_json::Value,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}
