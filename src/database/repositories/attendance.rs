use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{AttendanceRecord, AttendanceStatus};

const RECORD_COLUMNS: &str = r#"
    id,
    employee_id,
    company_id,
    work_date,
    clock_in,
    clock_out,
    clock_in_lat,
    clock_in_lng,
    clock_out_lat,
    clock_out_lng,
    work_duration_minutes,
    status,
    notes,
    adjustment_request_id,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AttendanceRecord>> {
        let record = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM attendance_records WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn find_for_day(
        &self,
        employee_id: Uuid,
        work_date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>> {
        let record = sqlx::query_as::<_, AttendanceRecord>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM attendance_records
            WHERE employee_id = $1 AND work_date = $2
            "#
        ))
        .bind(employee_id)
        .bind(work_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Creates the day's record at clock-in. The (employee_id,
    /// work_date) unique constraint turns a racing duplicate into a
    /// conflict instead of a second row.
    pub async fn create_clock_in(
        &self,
        employee_id: Uuid,
        company_id: Uuid,
        work_date: NaiveDate,
        clock_in: DateTime<Utc>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        notes: Option<String>,
    ) -> Result<AttendanceRecord> {
        let now = Utc::now();
        let record = sqlx::query_as::<_, AttendanceRecord>(&format!(
            r#"
            INSERT INTO attendance_records (
                id,
                employee_id,
                company_id,
                work_date,
                clock_in,
                clock_in_lat,
                clock_in_lng,
                status,
                notes,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(employee_id)
        .bind(company_id)
        .bind(work_date)
        .bind(clock_in)
        .bind(latitude)
        .bind(longitude)
        .bind(AttendanceStatus::Present)
        .bind(notes)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn set_clock_out(
        &self,
        id: Uuid,
        clock_out: DateTime<Utc>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        work_duration_minutes: i64,
        status: AttendanceStatus,
        notes: Option<String>,
    ) -> Result<AttendanceRecord> {
        let record = sqlx::query_as::<_, AttendanceRecord>(&format!(
            r#"
            UPDATE attendance_records
            SET
                clock_out = $1,
                clock_out_lat = $2,
                clock_out_lng = $3,
                work_duration_minutes = $4,
                status = $5,
                notes = $6,
                updated_at = $7
            WHERE id = $8
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(clock_out)
        .bind(latitude)
        .bind(longitude)
        .bind(work_duration_minutes)
        .bind(status)
        .bind(notes)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Settlement write for an approved adjustment: replacement clock
    /// times, recomputed duration and status, and the approved request
    /// linked for the audit trail.
    pub async fn apply_adjustment(
        &self,
        id: Uuid,
        clock_in: DateTime<Utc>,
        clock_out: DateTime<Utc>,
        work_duration_minutes: i64,
        status: AttendanceStatus,
        adjustment_request_id: Uuid,
    ) -> Result<AttendanceRecord> {
        let record = sqlx::query_as::<_, AttendanceRecord>(&format!(
            r#"
            UPDATE attendance_records
            SET
                clock_in = $1,
                clock_out = $2,
                work_duration_minutes = $3,
                status = $4,
                adjustment_request_id = $5,
                updated_at = $6
            WHERE id = $7
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(clock_in)
        .bind(clock_out)
        .bind(work_duration_minutes)
        .bind(status)
        .bind(adjustment_request_id)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    pub async fn list_for_period(
        &self,
        employee_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM attendance_records
            WHERE employee_id = $1 AND work_date BETWEEN $2 AND $3
            ORDER BY work_date
            "#
        ))
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
