use anyhow::Result;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{
    CreateOvertimeRequestInput, EmployeeRole, OvertimeRequest, RequestStatus,
    UpdateOvertimeRequestInput,
};

const OVERTIME_COLUMNS: &str = r#"
    id,
    employee_id,
    company_id,
    work_date,
    duration_minutes,
    reason,
    compensation,
    calculated_amount,
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
pub struct OvertimeRepository {
    pool: PgPool,
}

impl OvertimeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<OvertimeRequest>> {
        let request = sqlx::query_as::<_, OvertimeRequest>(&format!(
            "SELECT {OVERTIME_COLUMNS} FROM overtime_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// The active request for a day, if any. Backed by a partial
    /// unique index over pending/approved rows.
    pub async fn find_active_for_day(
        &self,
        employee_id: Uuid,
        work_date: NaiveDate,
    ) -> Result<Option<OvertimeRequest>> {
        let request = sqlx::query_as::<_, OvertimeRequest>(&format!(
            r#"
            SELECT {OVERTIME_COLUMNS}
            FROM overtime_requests
            WHERE employee_id = $1
                AND work_date = $2
                AND status IN ('pending', 'approved')
            "#
        ))
        .bind(employee_id)
        .bind(work_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        requested_by: Uuid,
        requester_role: EmployeeRole,
        preview_amount: &BigDecimal,
        input: &CreateOvertimeRequestInput,
    ) -> Result<OvertimeRequest> {
        let now = Utc::now();
        let request = sqlx::query_as::<_, OvertimeRequest>(&format!(
            r#"
            INSERT INTO overtime_requests (
                id,
                employee_id,
                company_id,
                work_date,
                duration_minutes,
                reason,
                compensation,
                calculated_amount,
                requested_by,
                requester_role,
                status,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {OVERTIME_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(input.employee_id)
        .bind(company_id)
        .bind(input.work_date)
        .bind(input.duration_minutes)
        .bind(&input.reason)
        .bind(input.compensation)
        .bind(preview_amount)
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
        preview_amount: &BigDecimal,
        input: &UpdateOvertimeRequestInput,
    ) -> Result<OvertimeRequest> {
        let request = sqlx::query_as::<_, OvertimeRequest>(&format!(
            r#"
            UPDATE overtime_requests
            SET
                work_date = $1,
                duration_minutes = $2,
                reason = $3,
                compensation = $4,
                calculated_amount = $5,
                updated_at = $6
            WHERE id = $7
            RETURNING {OVERTIME_COLUMNS}
            "#
        ))
        .bind(input.work_date)
        .bind(input.duration_minutes)
        .bind(&input.reason)
        .bind(input.compensation)
        .bind(preview_amount)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    /// Approval freezes the amount computed from the live policy;
    /// rejection leaves the preview untouched.
    pub async fn decide(
        &self,
        id: Uuid,
        status: RequestStatus,
        decided_by: Uuid,
        frozen_amount: Option<&BigDecimal>,
        rejection_reason: Option<String>,
    ) -> Result<OvertimeRequest> {
        let now = Utc::now();
        let request = sqlx::query_as::<_, OvertimeRequest>(&format!(
            r#"
            UPDATE overtime_requests
            SET
                status = $1,
                decided_by = $2,
                decided_at = $3,
                calculated_amount = COALESCE($4, calculated_amount),
                rejection_reason = $5,
                updated_at = $6
            WHERE id = $7
            RETURNING {OVERTIME_COLUMNS}
            "#
        ))
        .bind(status)
        .bind(decided_by)
        .bind(now)
        .bind(frozen_amount)
        .bind(rejection_reason)
        .bind(now)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM overtime_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn list_approved_for_period(
        &self,
        employee_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<OvertimeRequest>> {
        let requests = sqlx::query_as::<_, OvertimeRequest>(&format!(
            r#"
            SELECT {OVERTIME_COLUMNS}
            FROM overtime_requests
            WHERE employee_id = $1
                AND work_date BETWEEN $2 AND $3
                AND status = 'approved'
            ORDER BY work_date
            "#
        ))
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }
}
