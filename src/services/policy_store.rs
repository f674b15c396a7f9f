use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::audit_logger::{actions, AuditLogger};
use super::context::RequestContext;
use crate::database::models::audit::entity;
use crate::database::models::{CompanyPolicy, PolicyType};
use crate::database::repositories::PolicyRepository;
use crate::engine::policy::{AttendanceRules, LeavePolicy, OvertimePolicy, PayrollConfig};
use crate::error::AppError;

/// Boundary where opaque JSON policy blobs become typed configuration.
/// Absent policies fall back to engine defaults; malformed blobs are a
/// validation failure, never an untyped map passed downstream.
#[derive(Clone)]
pub struct PolicyStore {
    policies: PolicyRepository,
    audit: AuditLogger,
}

impl PolicyStore {
    pub fn new(policies: PolicyRepository, audit: AuditLogger) -> Self {
        Self { policies, audit }
    }

    pub async fn attendance_rules(&self, company_id: Uuid) -> Result<AttendanceRules, AppError> {
        self.load(company_id, PolicyType::AttendanceRules).await
    }

    pub async fn overtime_policy(&self, company_id: Uuid) -> Result<OvertimePolicy, AppError> {
        self.load(company_id, PolicyType::OvertimePolicy).await
    }

    pub async fn leave_policy(&self, company_id: Uuid) -> Result<LeavePolicy, AppError> {
        self.load(company_id, PolicyType::LeavePolicy).await
    }

    pub async fn payroll_config(&self, company_id: Uuid) -> Result<PayrollConfig, AppError> {
        self.load(company_id, PolicyType::PayrollConfig).await
    }

    async fn load<T: DeserializeOwned + Default>(
        &self,
        company_id: Uuid,
        policy_type: PolicyType,
    ) -> Result<T, AppError> {
        match self.policies.find_active(company_id, policy_type).await? {
            Some(row) => serde_json::from_value(row.config).map_err(|err| {
                AppError::validation(format!("malformed {} policy: {}", policy_type, err))
            }),
            None => Ok(T::default()),
        }
    }

    /// Appends a new policy version after checking the blob parses for
    /// its type. Owner only.
    pub async fn upsert(
        &self,
        ctx: &RequestContext,
        policy_type: PolicyType,
        config: serde_json::Value,
    ) -> Result<CompanyPolicy, AppError> {
        if !ctx.actor.is_owner() {
            return Err(AppError::forbidden("only the owner may change policies"));
        }

        self.validate_config(policy_type, &config)?;

        let policy = self
            .policies
            .insert_version(ctx.company_id, policy_type, config, ctx.actor.id)
            .await?;

        self.audit
            .record(
                ctx,
                actions::UPDATE,
                entity::COMPANY_POLICY,
                policy.id,
                None,
                AuditLogger::snapshot(&policy),
                None,
            )
            .await;

        Ok(policy)
    }

    fn validate_config(
        &self,
        policy_type: PolicyType,
        config: &serde_json::Value,
    ) -> Result<(), AppError> {
        let outcome = match policy_type {
            PolicyType::AttendanceRules => {
                serde_json::from_value::<AttendanceRules>(config.clone()).map(|_| ())
            }
            PolicyType::OvertimePolicy => {
                serde_json::from_value::<OvertimePolicy>(config.clone()).map(|_| ())
            }
            PolicyType::LeavePolicy => {
                serde_json::from_value::<LeavePolicy>(config.clone()).map(|_| ())
            }
            PolicyType::PayrollConfig => {
                serde_json::from_value::<PayrollConfig>(config.clone()).map(|_| ())
            }
        };
        outcome.map_err(|err| {
            AppError::validation(format!("invalid {} config: {}", policy_type, err))
        })
    }
}
