use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum EmployeeRole {
        Owner => "owner",
        Manager => "manager",
        Employee => "employee",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum EmploymentType {
        Monthly => "monthly",
        Hourly => "hourly",
        Daily => "daily",
    }
}

/// Directory row. The engine reads employees, it never manages them;
/// the directory service owns creation and profile updates.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub company_id: Uuid,
    pub manager_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub role: EmployeeRole,
    pub employment_type: EmploymentType,
    pub base_salary: Option<BigDecimal>,
    pub hourly_rate: Option<BigDecimal>,
    pub daily_rate: Option<BigDecimal>,
    pub health_insurance_enrolled: bool,
    pub employment_insurance_enrolled: bool,
    pub hire_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub timezone_offset_hours: i32,
    pub geofencing_enabled: bool,
    pub geofence_lat: Option<f64>,
    pub geofence_lng: Option<f64>,
    pub geofence_radius_meters: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
