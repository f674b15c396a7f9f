use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{CreateShiftScheduleInput, ShiftSchedule, ShiftSlot};

const SCHEDULE_COLUMNS: &str = r#"
    id,
    employee_id,
    company_id,
    day_of_week,
    slot_date,
    start_time,
    end_time,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The tagged slot splits into its column pair here and nowhere
    /// else; partial unique indexes keep each shape unique per
    /// employee without any raw-query workaround.
    pub async fn create(
        &self,
        company_id: Uuid,
        input: &CreateShiftScheduleInput,
    ) -> Result<ShiftSchedule> {
        let (day_of_week, slot_date) = match input.slot {
            ShiftSlot::Recurring { day_of_week } => (Some(day_of_week), None),
            ShiftSlot::DateSpecific { date } => (None, Some(date)),
        };

        let now = Utc::now();
        let schedule = sqlx::query_as::<_, ShiftSchedule>(&format!(
            r#"
            INSERT INTO shift_schedules (
                id,
                employee_id,
                company_id,
                day_of_week,
                slot_date,
                start_time,
                end_time,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {SCHEDULE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(input.employee_id)
        .bind(company_id)
        .bind(day_of_week)
        .bind(slot_date)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(schedule)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ShiftSchedule>> {
        let schedule = sqlx::query_as::<_, ShiftSchedule>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM shift_schedules WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(schedule)
    }

    pub async fn list_for_employee(&self, employee_id: Uuid) -> Result<Vec<ShiftSchedule>> {
        let schedules = sqlx::query_as::<_, ShiftSchedule>(&format!(
            r#"
            SELECT {SCHEDULE_COLUMNS}
            FROM shift_schedules
            WHERE employee_id = $1
            ORDER BY slot_date NULLS FIRST, day_of_week
            "#
        ))
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(schedules)
    }

    /// Slots covering one business day: the date-specific slot for that
    /// date plus any recurring slot on its weekday.
    pub async fn find_for_day(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
        day_of_week: i16,
    ) -> Result<Vec<ShiftSchedule>> {
        let schedules = sqlx::query_as::<_, ShiftSchedule>(&format!(
            r#"
            SELECT {SCHEDULE_COLUMNS}
            FROM shift_schedules
            WHERE employee_id = $1
                AND (slot_date = $2 OR day_of_week = $3)
            ORDER BY start_time
            "#
        ))
        .bind(employee_id)
        .bind(date)
        .bind(day_of_week)
        .fetch_all(&self.pool)
        .await?;

        Ok(schedules)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM shift_schedules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
