use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{CreateLeaveTypeInput, LeaveType, UpdateLeaveTypeInput};

const LEAVE_TYPE_COLUMNS: &str = r#"
    id,
    company_id,
    name,
    is_paid,
    max_balance,
    accrual_rate,
    carryover_allowed,
    carryover_max,
    expires_after_months,
    requires_attachment,
    is_active,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct LeaveTypeRepository {
    pool: PgPool,
}

impl LeaveTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<LeaveType>> {
        let leave_type = sqlx::query_as::<_, LeaveType>(&format!(
            "SELECT {LEAVE_TYPE_COLUMNS} FROM leave_types WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(leave_type)
    }

    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<LeaveType>> {
        let leave_types = sqlx::query_as::<_, LeaveType>(&format!(
            r#"
            SELECT {LEAVE_TYPE_COLUMNS}
            FROM leave_types
            WHERE company_id = $1
            ORDER BY name
            "#
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(leave_types)
    }

    pub async fn create(&self, company_id: Uuid, input: &CreateLeaveTypeInput) -> Result<LeaveType> {
        let now = Utc::now();
        let leave_type = sqlx::query_as::<_, LeaveType>(&format!(
            r#"
            INSERT INTO leave_types (
                id,
                company_id,
                name,
                is_paid,
                max_balance,
                accrual_rate,
                carryover_allowed,
                carryover_max,
                expires_after_months,
                requires_attachment,
                is_active,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE, $11, $12)
            RETURNING {LEAVE_TYPE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(&input.name)
        .bind(input.is_paid)
        .bind(&input.max_balance)
        .bind(&input.accrual_rate)
        .bind(input.carryover_allowed)
        .bind(&input.carryover_max)
        .bind(input.expires_after_months)
        .bind(input.requires_attachment)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(leave_type)
    }

    pub async fn update(&self, id: Uuid, input: &UpdateLeaveTypeInput) -> Result<LeaveType> {
        let leave_type = sqlx::query_as::<_, LeaveType>(&format!(
            r#"
            UPDATE leave_types
            SET
                name = COALESCE($1, name),
                is_paid = COALESCE($2, is_paid),
                max_balance = COALESCE($3, max_balance),
                accrual_rate = COALESCE($4, accrual_rate),
                carryover_allowed = COALESCE($5, carryover_allowed),
                carryover_max = COALESCE($6, carryover_max),
                expires_after_months = COALESCE($7, expires_after_months),
                requires_attachment = COALESCE($8, requires_attachment),
                is_active = COALESCE($9, is_active),
                updated_at = $10
            WHERE id = $11
            RETURNING {LEAVE_TYPE_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(input.is_paid)
        .bind(&input.max_balance)
        .bind(&input.accrual_rate)
        .bind(input.carryover_allowed)
        .bind(&input.carryover_max)
        .bind(input.expires_after_months)
        .bind(input.requires_attachment)
        .bind(input.is_active)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(leave_type)
    }
}
