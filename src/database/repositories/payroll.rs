use anyhow::Result;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::{PayrollItem, PayrollRun, PayrollRunStatus};
use crate::engine::payroll::{OverriddenTotals, PayComputation};

const RUN_COLUMNS: &str = r#"
    id,
    company_id,
    period_year,
    period_month,
    status,
    total_amount,
    created_by,
    created_at,
    updated_at
"#;

const ITEM_COLUMNS: &str = r#"
    id,
    payroll_run_id,
    employee_id,
    base_pay,
    overtime_pay,
    allowance,
    bonus,
    transport_bonus,
    lunch_bonus,
    holiday_bonus,
    deductions,
    employee_health_contribution,
    employer_health_contribution,
    employee_employment_contribution,
    employer_employment_contribution,
    withholding,
    gross_pay,
    net_pay,
    breakdown,
    created_at,
    updated_at
"#;

pub struct NewPayrollItem {
    pub employee_id: Uuid,
    pub computation: PayComputation,
}

#[derive(Clone)]
pub struct PayrollRepository {
    pool: PgPool,
}

impl PayrollRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the run and all of its items in one transaction, so a
    /// mid-flight failure never leaves a half-populated run behind.
    /// The (company_id, period) unique key rejects a racing duplicate.
    pub async fn create_run_with_items(
        &self,
        company_id: Uuid,
        period_year: i32,
        period_month: i32,
        created_by: Uuid,
        items: Vec<NewPayrollItem>,
    ) -> Result<(PayrollRun, Vec<PayrollItem>)> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let run_id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO payroll_runs (
                id, company_id, period_year, period_month, status,
                total_amount, created_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, 0, $6, $7, $8)
            "#,
        )
        .bind(run_id)
        .bind(company_id)
        .bind(period_year)
        .bind(period_month)
        .bind(PayrollRunStatus::Processing)
        .bind(created_by)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut inserted = Vec::with_capacity(items.len());
        for item in &items {
            inserted.push(Self::insert_item(&mut tx, run_id, item).await?);
        }

        let run = sqlx::query_as::<_, PayrollRun>(&format!(
            r#"
            UPDATE payroll_runs
            SET
                status = $1,
                total_amount = (
                    SELECT COALESCE(SUM(net_pay), 0)
                    FROM payroll_items
                    WHERE payroll_run_id = $2
                ),
                updated_at = $3
            WHERE id = $2
            RETURNING {RUN_COLUMNS}
            "#
        ))
        .bind(PayrollRunStatus::Draft)
        .bind(run_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((run, inserted))
    }

    /// Replaces a draft run's items with a fresh computation, in one
    /// transaction, and refreshes the total.
    pub async fn replace_items(
        &self,
        run_id: Uuid,
        items: Vec<NewPayrollItem>,
    ) -> Result<(PayrollRun, Vec<PayrollItem>)> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM payroll_items WHERE payroll_run_id = $1")
            .bind(run_id)
            .execute(&mut *tx)
            .await?;

        let mut inserted = Vec::with_capacity(items.len());
        for item in &items {
            inserted.push(Self::insert_item(&mut tx, run_id, item).await?);
        }

        let run = sqlx::query_as::<_, PayrollRun>(&format!(
            r#"
            UPDATE payroll_runs
            SET
                total_amount = (
                    SELECT COALESCE(SUM(net_pay), 0)
                    FROM payroll_items
                    WHERE payroll_run_id = $1
                ),
                updated_at = $2
            WHERE id = $1
            RETURNING {RUN_COLUMNS}
            "#
        ))
        .bind(run_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((run, inserted))
    }

    async fn insert_item(
        tx: &mut Transaction<'_, Postgres>,
        run_id: Uuid,
        item: &NewPayrollItem,
    ) -> Result<PayrollItem> {
        let now = Utc::now();
        let c = &item.computation;
        let row = sqlx::query_as::<_, PayrollItem>(&format!(
            r#"
            INSERT INTO payroll_items (
                id,
                payroll_run_id,
                employee_id,
                base_pay,
                overtime_pay,
                allowance,
                bonus,
                transport_bonus,
                lunch_bonus,
                holiday_bonus,
                deductions,
                employee_health_contribution,
                employer_health_contribution,
                employee_employment_contribution,
                employer_employment_contribution,
                withholding,
                gross_pay,
                net_pay,
                breakdown,
                created_at,
                updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                $12, $13, $14, $15, $16, $17, $18, $19, $20, $21
            )
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(run_id)
        .bind(item.employee_id)
        .bind(&c.base_pay)
        .bind(&c.overtime_pay)
        .bind(&c.allowance)
        .bind(&c.bonus)
        .bind(&c.transport_bonus)
        .bind(&c.lunch_bonus)
        .bind(&c.holiday_bonus)
        .bind(&c.deductions)
        .bind(&c.employee_health_contribution)
        .bind(&c.employer_health_contribution)
        .bind(&c.employee_employment_contribution)
        .bind(&c.employer_employment_contribution)
        .bind(&c.withholding)
        .bind(&c.gross_pay)
        .bind(&c.net_pay)
        .bind(serde_json::to_value(&c.breakdown)?)
        .bind(now)
        .bind(now)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row)
    }

    pub async fn find_run_by_id(&self, id: Uuid) -> Result<Option<PayrollRun>> {
        let run = sqlx::query_as::<_, PayrollRun>(&format!(
            "SELECT {RUN_COLUMNS} FROM payroll_runs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(run)
    }

    pub async fn find_run_for_period(
        &self,
        company_id: Uuid,
        period_year: i32,
        period_month: i32,
    ) -> Result<Option<PayrollRun>> {
        let run = sqlx::query_as::<_, PayrollRun>(&format!(
            r#"
            SELECT {RUN_COLUMNS}
            FROM payroll_runs
            WHERE company_id = $1 AND period_year = $2 AND period_month = $3
            "#
        ))
        .bind(company_id)
        .bind(period_year)
        .bind(period_month)
        .fetch_optional(&self.pool)
        .await?;

        Ok(run)
    }

    pub async fn list_runs(&self, company_id: Uuid) -> Result<Vec<PayrollRun>> {
        let runs = sqlx::query_as::<_, PayrollRun>(&format!(
            r#"
            SELECT {RUN_COLUMNS}
            FROM payroll_runs
            WHERE company_id = $1
            ORDER BY period_year DESC, period_month DESC
            "#
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(runs)
    }

    pub async fn update_run_status(
        &self,
        id: Uuid,
        status: PayrollRunStatus,
    ) -> Result<PayrollRun> {
        let run = sqlx::query_as::<_, PayrollRun>(&format!(
            r#"
            UPDATE payroll_runs
            SET status = $1, updated_at = $2
            WHERE id = $3
            RETURNING {RUN_COLUMNS}
            "#
        ))
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(run)
    }

    /// Items are owned by the run and go with it.
    pub async fn delete_run(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM payroll_runs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn list_items(&self, run_id: Uuid) -> Result<Vec<PayrollItem>> {
        let items = sqlx::query_as::<_, PayrollItem>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM payroll_items
            WHERE payroll_run_id = $1
            ORDER BY created_at
            "#
        ))
        .bind(run_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    pub async fn find_item(&self, id: Uuid) -> Result<Option<PayrollItem>> {
        let item = sqlx::query_as::<_, PayrollItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM payroll_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Writes the overridden manual fields plus re-derived totals, and
    /// re-aggregates the parent run total, in one transaction.
    pub async fn apply_item_override(
        &self,
        item_id: Uuid,
        run_id: Uuid,
        totals: &OverriddenTotals,
    ) -> Result<(PayrollItem, PayrollRun)> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let item = sqlx::query_as::<_, PayrollItem>(&format!(
            r#"
            UPDATE payroll_items
            SET
                allowance = $1,
                bonus = $2,
                transport_bonus = $3,
                lunch_bonus = $4,
                holiday_bonus = $5,
                deductions = $6,
                withholding = $7,
                gross_pay = $8,
                net_pay = $9,
                updated_at = $10
            WHERE id = $11
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(&totals.allowance)
        .bind(&totals.bonus)
        .bind(&totals.transport_bonus)
        .bind(&totals.lunch_bonus)
        .bind(&totals.holiday_bonus)
        .bind(&totals.deductions)
        .bind(&totals.withholding)
        .bind(&totals.gross_pay)
        .bind(&totals.net_pay)
        .bind(now)
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;

        let run = sqlx::query_as::<_, PayrollRun>(&format!(
            r#"
            UPDATE payroll_runs
            SET
                total_amount = (
                    SELECT COALESCE(SUM(net_pay), 0)
                    FROM payroll_items
                    WHERE payroll_run_id = $1
                ),
                updated_at = $2
            WHERE id = $1
            RETURNING {RUN_COLUMNS}
            "#
        ))
        .bind(run_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((item, run))
    }
}
