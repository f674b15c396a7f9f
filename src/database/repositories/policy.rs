use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{CompanyPolicy, PolicyType};

const POLICY_COLUMNS: &str = r#"
    id,
    company_id,
    policy_type,
    version,
    is_active,
    config,
    created_by,
    created_at
"#;

#[derive(Clone)]
pub struct PolicyRepository {
    pool: PgPool,
}

impl PolicyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The one row that applies: highest version still active.
    pub async fn find_active(
        &self,
        company_id: Uuid,
        policy_type: PolicyType,
    ) -> Result<Option<CompanyPolicy>> {
        let policy = sqlx::query_as::<_, CompanyPolicy>(&format!(
            r#"
            SELECT {POLICY_COLUMNS}
            FROM company_policies
            WHERE company_id = $1 AND policy_type = $2 AND is_active = TRUE
            ORDER BY version DESC
            LIMIT 1
            "#
        ))
        .bind(company_id)
        .bind(policy_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(policy)
    }

    /// New versions append; older rows stay for the record.
    pub async fn insert_version(
        &self,
        company_id: Uuid,
        policy_type: PolicyType,
        config: serde_json::Value,
        created_by: Uuid,
    ) -> Result<CompanyPolicy> {
        let policy = sqlx::query_as::<_, CompanyPolicy>(&format!(
            r#"
            INSERT INTO company_policies (
                id, company_id, policy_type, version, is_active, config, created_by, created_at
            )
            VALUES (
                $1,
                $2,
                $3,
                COALESCE(
                    (
                        SELECT MAX(version)
                        FROM company_policies
                        WHERE company_id = $2 AND policy_type = $3
                    ),
                    0
                ) + 1,
                TRUE,
                $4,
                $5,
                $6
            )
            RETURNING {POLICY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(policy_type)
        .bind(config)
        .bind(created_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(policy)
    }
}
