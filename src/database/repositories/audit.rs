use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::CreateAuditInput;

#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, input: CreateAuditInput) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_events (
                id,
                company_id,
                actor_id,
                action,
                entity_type,
                entity_id,
                before,
                after,
                reason,
                ip_address,
                user_agent,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.company_id)
        .bind(input.actor_id)
        .bind(&input.action)
        .bind(&input.entity_type)
        .bind(input.entity_id)
        .bind(&input.before)
        .bind(&input.after)
        .bind(&input.reason)
        .bind(&input.ip_address)
        .bind(&input.user_agent)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
