use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub id: Uuid,
    pub company_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
    pub reason: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateAuditInput {
    pub company_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
    pub reason: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

pub mod entity {
    pub const ATTENDANCE_RECORD: &str = "attendance_record";
    pub const ADJUSTMENT_REQUEST: &str = "adjustment_request";
    pub const LEAVE_TYPE: &str = "leave_type";
    pub const LEAVE_BALANCE: &str = "leave_balance";
    pub const LEAVE_REQUEST: &str = "leave_request";
    pub const OVERTIME_REQUEST: &str = "overtime_request";
    pub const PAYROLL_RUN: &str = "payroll_run";
    pub const PAYROLL_ITEM: &str = "payroll_item";
    pub const SHIFT_SCHEDULE: &str = "shift_schedule";
    pub const COMPANY_POLICY: &str = "company_policy";
}
