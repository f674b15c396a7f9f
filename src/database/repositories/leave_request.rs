use anyhow::Result;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{
    CreateLeaveRequestInput, EmployeeRole, LeaveRequest, RequestStatus, UpdateLeaveRequestInput,
};

const LEAVE_REQUEST_COLUMNS: &str = r#"
    id,
    employee_id,
    leave_type_id,
    company_id,
    start_date,
    end_date,
    days,
    reason,
    attachment_url,
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
pub struct LeaveRequestRepository {
    pool: PgPool,
}

impl LeaveRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<LeaveRequest>> {
        let request = sqlx::query_as::<_, LeaveRequest>(&format!(
            "SELECT {LEAVE_REQUEST_COLUMNS} FROM leave_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Active requests whose [start, end] intersects the given range.
    /// `id_to_skip` lets updates ignore the request being edited.
    pub async fn find_overlapping(
        &self,
        employee_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        id_to_skip: Option<Uuid>,
    ) -> Result<Vec<LeaveRequest>> {
        let requests = sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            SELECT {LEAVE_REQUEST_COLUMNS}
            FROM leave_requests
            WHERE employee_id = $1
                AND status IN ('pending', 'approved')
                AND start_date <= $3
                AND end_date >= $2
                AND ($4::uuid IS NULL OR id <> $4)
            "#
        ))
        .bind(employee_id)
        .bind(start_date)
        .bind(end_date)
        .bind(id_to_skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    pub async fn create(
        &self,
        company_id: Uuid,
        requested_by: Uuid,
        requester_role: EmployeeRole,
        days: &BigDecimal,
        input: &CreateLeaveRequestInput,
    ) -> Result<LeaveRequest> {
        let now = Utc::now();
        let request = sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            INSERT INTO leave_requests (
                id,
                employee_id,
                leave_type_id,
                company_id,
                start_date,
                end_date,
                days,
                reason,
                attachment_url,
                requested_by,
                requester_role,
                status,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {LEAVE_REQUEST_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(input.employee_id)
        .bind(input.leave_type_id)
        .bind(company_id)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(days)
        .bind(&input.reason)
        .bind(&input.attachment_url)
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
        days: &BigDecimal,
        input: &UpdateLeaveRequestInput,
    ) -> Result<LeaveRequest> {
        let request = sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            UPDATE leave_requests
            SET
                start_date = $1,
                end_date = $2,
                days = $3,
                reason = $4,
                attachment_url = $5,
                updated_at = $6
            WHERE id = $7
            RETURNING {LEAVE_REQUEST_COLUMNS}
            "#
        ))
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(days)
        .bind(&input.reason)
        .bind(&input.attachment_url)
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
    ) -> Result<LeaveRequest> {
        let now = Utc::now();
        let request = sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            UPDATE leave_requests
            SET
                status = $1,
                decided_by = $2,
                decided_at = $3,
                rejection_reason = $4,
                updated_at = $5
            WHERE id = $6
            RETURNING {LEAVE_REQUEST_COLUMNS}
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
        sqlx::query("DELETE FROM leave_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn list_for_employee(
        &self,
        employee_id: Uuid,
        status: Option<RequestStatus>,
    ) -> Result<Vec<LeaveRequest>> {
        let requests = sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            SELECT {LEAVE_REQUEST_COLUMNS}
            FROM leave_requests
            WHERE employee_id = $1
                AND ($2::varchar IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(employee_id)
        .bind(status.map(|s| s.to_string()))
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }
}
