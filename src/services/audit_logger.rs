use serde::Serialize;
use uuid::Uuid;

use super::context::RequestContext;
use crate::database::models::CreateAuditInput;
use crate::database::repositories::AuditRepository;

pub mod actions {
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
    pub const APPROVE: &str = "approve";
    pub const REJECT: &str = "reject";
    pub const RESUBMIT: &str = "resubmit";
    pub const CLOCK_IN: &str = "clock_in";
    pub const CLOCK_OUT: &str = "clock_out";
    pub const SET_QUOTA: &str = "set_quota";
    pub const LOCK: &str = "lock";
    pub const MARK_PAID: &str = "mark_paid";
    pub const OVERRIDE: &str = "override";
}

/// One wrapper around the audit sink for every state transition, so
/// the before/after bookkeeping is not hand-inlined per branch.
/// Delivery is best-effort: a sink failure is logged and swallowed,
/// never surfaced to the caller.
#[derive(Clone)]
pub struct AuditLogger {
    repository: AuditRepository,
}

impl AuditLogger {
    pub fn new(repository: AuditRepository) -> Self {
        Self { repository }
    }

    pub fn snapshot<T: Serialize>(value: &T) -> Option<serde_json::Value> {
        serde_json::to_value(value).ok()
    }

    pub async fn record(
        &self,
        ctx: &RequestContext,
        action: &str,
        entity_type: &str,
        entity_id: Uuid,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
        reason: Option<String>,
    ) {
        let input = CreateAuditInput {
            company_id: ctx.company_id,
            actor_id: Some(ctx.actor.id),
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            entity_id,
            before,
            after,
            reason,
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
        };

        if let Err(err) = self.repository.record(input).await {
            log::warn!(
                "audit logging failed for {} {} ({}): {}",
                entity_type,
                entity_id,
                action,
                err
            );
        }
    }
}
