use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{
    AdjustmentInput, AdjustmentRequest, EmployeeRole, RequestStatus,
};

const ADJUSTMENT_COLUMNS: &str = r#"
    id,
    attendance_record_id,
    employee_id,
    company_id,
    requested_clock_in,
    requested_clock_out,
    reason,
    requested_by,
    requester_role,
    status,
    rejection_reason,
    decided_by,
    decided_at,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct AdjustmentRepository {
    pool: PgPool,
}

impl AdjustmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AdjustmentRequest>> {
        let request = sqlx::query_as::<_, AdjustmentRequest>(&format!(
            "SELECT {ADJUSTMENT_COLUMNS} FROM adjustment_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// The active request for a record, if any. Backed by a partial
    /// unique index over pending/approved rows.
    pub async fn find_active_for_record(
        &self,
        attendance_record_id: Uuid,
    ) -> Result<Option<AdjustmentRequest>> {
        let request = sqlx::query_as::<_, AdjustmentRequest>(&format!(
            r#"
            SELECT {ADJUSTMENT_COLUMNS}
            FROM adjustment_requests
            WHERE attendance_record_id = $1 AND status IN ('pending', 'approved')
            "#
        ))
        .bind(attendance_record_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn create(
        &self,
        employee_id: Uuid,
        company_id: Uuid,
        requested_by: Uuid,
        requester_role: EmployeeRole,
        input: &AdjustmentInput,
    ) -> Result<AdjustmentRequest> {
        let now = Utc::now();
        let request = sqlx::query_as::<_, AdjustmentRequest>(&format!(
            r#"
            INSERT INTO adjustment_requests (
                id,
                attendance_record_id,
                employee_id,
                company_id,
                requested_clock_in,
                requested_clock_out,
                reason,
                requested_by,
                requester_role,
                status,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {ADJUSTMENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(input.attendance_record_id)
        .bind(employee_id)
        .bind(company_id)
        .bind(input.requested_clock_in)
        .bind(input.requested_clock_out)
        .bind(&input.reason)
        .bind(requested_by)
        .bind(requester_role)
        .bind(RequestStatus::Pending)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn update_content(
        &self,
        id: Uuid,
        input: &AdjustmentInput,
    ) -> Result<AdjustmentRequest> {
        let request = sqlx::query_as::<_, AdjustmentRequest>(&format!(
            r#"
            UPDATE adjustment_requests
            SET
                requested_clock_in = $1,
                requested_clock_out = $2,
                reason = $3,
                updated_at = $4
            WHERE id = $5
            RETURNING {ADJUSTMENT_COLUMNS}
            "#
        ))
        .bind(input.requested_clock_in)
        .bind(input.requested_clock_out)
        .bind(&input.reason)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    /// Resubmission overwrites the rejected content in place and
    /// re-enters pending with the rejection reason cleared.
    pub async fn resubmit(&self, id: Uuid, input: &AdjustmentInput) -> Result<AdjustmentRequest> {
        let request = sqlx::query_as::<_, AdjustmentRequest>(&format!(
            r#"
            UPDATE adjustment_requests
            SET
                requested_clock_in = $1,
                requested_clock_out = $2,
                reason = $3,
                status = $4,
                rejection_reason = NULL,
                decided_by = NULL,
                decided_at = NULL,
                updated_at = $5
            WHERE id = $6
            RETURNING {ADJUSTMENT_COLUMNS}
            "#
        ))
        .bind(input.requested_clock_in)
        .bind(input.requested_clock_out)
        .bind(&input.reason)
        .bind(RequestStatus::Pending)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn decide(
        &self,
        id: Uuid,
        status: RequestStatus,
        decided_by: Uuid,
        rejection_reason: Option<String>,
    ) -> Result<AdjustmentRequest> {
        let now = Utc::now();
        let request = sqlx::query_as::<_, AdjustmentRequest>(&format!(
            r#"
            UPDATE adjustment_requests
            SET
                status = $1,
                decided_by = $2,
                decided_at = $3,
                rejection_reason = $4,
                updated_at = $5
            WHERE id = $6
            RETURNING {ADJUSTMENT_COLUMNS}
            "#
        ))
        .bind(status)
        .bind(decided_by)
        .bind(now)
        .bind(rejection_reason)
        .bind(now)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM adjustment_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
