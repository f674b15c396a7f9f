use anyhow::Result;
use bigdecimal::BigDecimal;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::LeaveBalance;
use crate::engine::leave::AccrualOutcome;

const BALANCE_COLUMNS: &str = r#"
    id,
    employee_id,
    leave_type_id,
    period_year,
    period_month,
    balance,
    accrued,
    used,
    carried_over,
    expired,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct LeaveBalanceRepository {
    pool: PgPool,
}

impl LeaveBalanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_for_period(
        &self,
        employee_id: Uuid,
        leave_type_id: Uuid,
        period_year: i32,
        period_month: i32,
    ) -> Result<Option<LeaveBalance>> {
        let balance = sqlx::query_as::<_, LeaveBalance>(&format!(
            r#"
            SELECT {BALANCE_COLUMNS}
            FROM leave_balances
            WHERE employee_id = $1
                AND leave_type_id = $2
                AND period_year = $3
                AND period_month = $4
            "#
        ))
        .bind(employee_id)
        .bind(leave_type_id)
        .bind(period_year)
        .bind(period_month)
        .fetch_optional(&self.pool)
        .await?;

        Ok(balance)
    }

    /// One row per period key, ever. Recomputation lands on the same
    /// row; `used` is written from the outcome, which carries the
    /// existing value through.
    pub async fn upsert(
        &self,
        employee_id: Uuid,
        leave_type_id: Uuid,
        period_year: i32,
        period_month: i32,
        outcome: &AccrualOutcome,
    ) -> Result<LeaveBalance> {
        let now = Utc::now();
        let balance = sqlx::query_as::<_, LeaveBalance>(&format!(
            r#"
            INSERT INTO leave_balances (
                id,
                employee_id,
                leave_type_id,
                period_year,
                period_month,
                balance,
                accrued,
                used,
                carried_over,
                expired,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (employee_id, leave_type_id, period_year, period_month)
            DO UPDATE SET
                balance = EXCLUDED.balance,
                accrued = EXCLUDED.accrued,
                used = EXCLUDED.used,
                carried_over = EXCLUDED.carried_over,
                expired = EXCLUDED.expired,
                updated_at = EXCLUDED.updated_at
            RETURNING {BALANCE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(employee_id)
        .bind(leave_type_id)
        .bind(period_year)
        .bind(period_month)
        .bind(&outcome.balance)
        .bind(&outcome.accrued)
        .bind(&outcome.used)
        .bind(&outcome.carried_over)
        .bind(&outcome.expired)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(balance)
    }

    /// Administrator-set quota. The only writer allowed to reset `used`.
    pub async fn set_manual_quota(
        &self,
        employee_id: Uuid,
        leave_type_id: Uuid,
        period_year: i32,
        period_month: i32,
        balance: &BigDecimal,
        used: Option<&BigDecimal>,
    ) -> Result<LeaveBalance> {
        let now = Utc::now();
        let zero = BigDecimal::from(0);
        let row = sqlx::query_as::<_, LeaveBalance>(&format!(
            r#"
            INSERT INTO leave_balances (
                id,
                employee_id,
                leave_type_id,
                period_year,
                period_month,
                balance,
                accrued,
                used,
                carried_over,
                expired,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $7, $7, $9, $10)
            ON CONFLICT (employee_id, leave_type_id, period_year, period_month)
            DO UPDATE SET
                balance = EXCLUDED.balance,
                used = COALESCE($11, leave_balances.used),
                updated_at = EXCLUDED.updated_at
            RETURNING {BALANCE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(employee_id)
        .bind(leave_type_id)
        .bind(period_year)
        .bind(period_month)
        .bind(balance)
        .bind(&zero)
        .bind(used.unwrap_or(&zero))
        .bind(now)
        .bind(now)
        .bind(used)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Approval settlement: move days from available to used.
    pub async fn debit(&self, id: Uuid, days: &BigDecimal) -> Result<LeaveBalance> {
        let balance = sqlx::query_as::<_, LeaveBalance>(&format!(
            r#"
            UPDATE leave_balances
            SET
                balance = balance - $1,
                used = used + $1,
                updated_at = $2
            WHERE id = $3
            RETURNING {BALANCE_COLUMNS}
            "#
        ))
        .bind(days)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(balance)
    }

    pub async fn list_for_employee_year(
        &self,
        employee_id: Uuid,
        period_year: i32,
    ) -> Result<Vec<LeaveBalance>> {
        let balances = sqlx::query_as::<_, LeaveBalance>(&format!(
            r#"
            SELECT {BALANCE_COLUMNS}
            FROM leave_balances
            WHERE employee_id = $1 AND period_year = $2
            ORDER BY leave_type_id, period_month
            "#
        ))
        .bind(employee_id)
        .bind(period_year)
        .fetch_all(&self.pool)
        .await?;

        Ok(balances)
    }
}
