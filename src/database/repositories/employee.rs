use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Company, Employee};

/// Read-only view of the directory service's tables. The engine never
/// creates or edits employees or companies.
#[derive(Clone)]
pub struct DirectoryRepository {
    pool: PgPool,
}

impl DirectoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_employee(&self, id: Uuid) -> Result<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            SELECT
                id,
                company_id,
                manager_id,
                name,
                email,
                role,
                employment_type,
                base_salary,
                hourly_rate,
                daily_rate,
                health_insurance_enrolled,
                employment_insurance_enrolled,
                hire_date,
                is_active,
                created_at,
                updated_at
            FROM
                employees
            WHERE
                id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    pub async fn list_active_employees(&self, company_id: Uuid) -> Result<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT
                id,
                company_id,
                manager_id,
                name,
                email,
                role,
                employment_type,
                base_salary,
                hourly_rate,
                daily_rate,
                health_insurance_enrolled,
                employment_insurance_enrolled,
                hire_date,
                is_active,
                created_at,
                updated_at
            FROM
                employees
            WHERE
                company_id = $1
                AND is_active = TRUE
            ORDER BY
                name
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    pub async fn find_company(&self, id: Uuid) -> Result<Option<Company>> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT
                id,
                name,
                timezone_offset_hours,
                geofencing_enabled,
                geofence_lat,
                geofence_lng,
                geofence_radius_meters,
                created_at,
                updated_at
            FROM
                companies
            WHERE
                id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }
}
