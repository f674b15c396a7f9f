use uuid::Uuid;

use super::audit_logger::{actions, AuditLogger};
use super::context::RequestContext;
use super::policy_store::PolicyStore;
use crate::database::models::audit::entity;
use crate::database::models::{
    CreateOvertimeRequestInput, DecisionInput, Employee, OvertimeRequest, RequestStatus,
    UpdateOvertimeRequestInput,
};
use crate::database::repositories::{DirectoryRepository, OvertimeRepository};
use crate::engine::overtime::{compute_pay, is_holiday};
use crate::engine::workflow;
use crate::error::AppError;

#[derive(Clone)]
pub struct OvertimeService {
    directory: DirectoryRepository,
    requests: OvertimeRepository,
    policies: PolicyStore,
    audit: AuditLogger,
}

impl OvertimeService {
    pub fn new(
        directory: DirectoryRepository,
        requests: OvertimeRepository,
        policies: PolicyStore,
        audit: AuditLogger,
    ) -> Self {
        Self {
            directory,
            requests,
            policies,
            audit,
        }
    }

    /// The stored amount at creation is a preview under the live
    /// policy; only approval freezes it.
    pub async fn create_request(
        &self,
        ctx: &RequestContext,
        input: &CreateOvertimeRequestInput,
    ) -> Result<OvertimeRequest, AppError> {
        let employee = self.employee_in_company(ctx, input.employee_id).await?;
        self.ensure_may_submit_for(ctx, &employee)?;
        if input.duration_minutes <= 0 {
            return Err(AppError::validation("overtime duration must be positive"));
        }

        if self
            .requests
            .find_active_for_day(employee.id, input.work_date)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(
                "an active overtime request already exists for this day",
            ));
        }

        let policy = self.policies.overtime_policy(ctx.company_id).await?;
        let preview = compute_pay(
            input.work_date,
            input.duration_minutes,
            &employee,
            &policy,
            is_holiday(input.work_date, &policy),
        );

        let request = self
            .requests
            .create(ctx.company_id, ctx.actor.id, ctx.actor.role, &preview, input)
            .await?;

        self.audit
            .record(
                ctx,
                actions::CREATE,
                entity::OVERTIME_REQUEST,
                request.id,
                None,
                AuditLogger::snapshot(&request),
                None,
            )
            .await;

        Ok(request)
    }

    pub async fn update_request(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: &UpdateOvertimeRequestInput,
    ) -> Result<OvertimeRequest, AppError> {
        let request = self.request_in_company(ctx, id).await?;
        workflow::ensure_pending(request.status, "overtime request")?;
        workflow::ensure_requester(request.requested_by, ctx.actor.id, "overtime request")?;
        if input.duration_minutes <= 0 {
            return Err(AppError::validation("overtime duration must be positive"));
        }
        if input.work_date != request.work_date
            && self
                .requests
                .find_active_for_day(request.employee_id, input.work_date)
                .await?
                .is_some()
        {
            return Err(AppError::conflict(
                "an active overtime request already exists for this day",
            ));
        }

        let employee = self.employee_in_company(ctx, request.employee_id).await?;
        let policy = self.policies.overtime_policy(ctx.company_id).await?;
        let preview = compute_pay(
            input.work_date,
            input.duration_minutes,
            &employee,
            &policy,
            is_holiday(input.work_date, &policy),
        );

        let before = AuditLogger::snapshot(&request);
        let updated = self.requests.update_content(id, &preview, input).await?;

        self.audit
            .record(
                ctx,
                actions::UPDATE,
                entity::OVERTIME_REQUEST,
                updated.id,
                before,
                AuditLogger::snapshot(&updated),
                None,
            )
            .await;

        Ok(updated)
    }

    pub async fn delete_request(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        let request = self.request_in_company(ctx, id).await?;
        workflow::ensure_pending(request.status, "overtime request")?;
        workflow::ensure_requester(request.requested_by, ctx.actor.id, "overtime request")?;

        self.requests.delete(id).await?;

        self.audit
            .record(
                ctx,
                actions::DELETE,
                entity::OVERTIME_REQUEST,
                id,
                AuditLogger::snapshot(&request),
                None,
                None,
            )
            .await;

        Ok(())
    }

    /// Approval recomputes the amount under the policy active now, not
    /// at creation, and freezes it together with the status flip.
    pub async fn approve_request(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<OvertimeRequest, AppError> {
        let request = self.request_in_company(ctx, id).await?;
        workflow::ensure_pending(request.status, "overtime request")?;
        let employee = self.employee_in_company(ctx, request.employee_id).await?;
        workflow::authorize_decision(
            request.requester_role,
            employee.manager_id,
            ctx.actor.id,
            ctx.actor.role,
        )?;

        let policy = self.policies.overtime_policy(ctx.company_id).await?;
        let frozen = compute_pay(
            request.work_date,
            request.duration_minutes,
            &employee,
            &policy,
            is_holiday(request.work_date, &policy),
        );

        let before = AuditLogger::snapshot(&request);
        let approved = self
            .requests
            .decide(
                id,
                RequestStatus::Approved,
                ctx.actor.id,
                Some(&frozen),
                None,
            )
            .await?;

        self.audit
            .record(
                ctx,
                actions::APPROVE,
                entity::OVERTIME_REQUEST,
                approved.id,
                before,
                AuditLogger::snapshot(&approved),
                None,
            )
            .await;

        Ok(approved)
    }

    pub async fn reject_request(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: &DecisionInput,
    ) -> Result<OvertimeRequest, AppError> {
        let request = self.request_in_company(ctx, id).await?;
        workflow::ensure_pending(request.status, "overtime request")?;
        let employee = self.employee_in_company(ctx, request.employee_id).await?;
        workflow::authorize_decision(
            request.requester_role,
            employee.manager_id,
            ctx.actor.id,
            ctx.actor.role,
        )?;

        let before = AuditLogger::snapshot(&request);
        let rejected = self
            .requests
            .decide(
                id,
                RequestStatus::Rejected,
                ctx.actor.id,
                None,
                input.reason.clone(),
            )
            .await?;

        self.audit
            .record(
                ctx,
                actions::REJECT,
                entity::OVERTIME_REQUEST,
                rejected.id,
                before,
                AuditLogger::snapshot(&rejected),
                input.reason.clone(),
            )
            .await;

        Ok(rejected)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn employee_in_company(
        &self,
        ctx: &RequestContext,
        employee_id: Uuid,
    ) -> Result<Employee, AppError> {
        self.directory
            .find_employee(employee_id)
            .await?
            .filter(|e| e.company_id == ctx.company_id)
            .ok_or_else(|| AppError::not_found("employee not found"))
    }

    async fn request_in_company(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<OvertimeRequest, AppError> {
        self.requests
            .find_by_id(id)
            .await?
            .filter(|r| r.company_id == ctx.company_id)
            .ok_or_else(|| AppError::not_found("overtime request not found"))
    }

    fn ensure_may_submit_for(
        &self,
        ctx: &RequestContext,
        employee: &Employee,
    ) -> Result<(), AppError> {
        if ctx.actor.id == employee.id || ctx.actor.is_owner() {
            return Ok(());
        }
        if ctx.actor.is_manager() && employee.manager_id == Some(ctx.actor.id) {
            return Ok(());
        }
        Err(AppError::forbidden(
            "you can only submit requests for yourself or your direct reports",
        ))
    }
}
