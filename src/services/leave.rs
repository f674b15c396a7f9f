use bigdecimal::BigDecimal;
use chrono::Datelike;
use uuid::Uuid;

use super::audit_logger::{actions, AuditLogger};
use super::context::RequestContext;
use super::policy_store::PolicyStore;
use crate::database::models::audit::entity;
use crate::database::models::{
    CreateLeaveRequestInput, CreateLeaveTypeInput, DecisionInput, Employee, LeaveBalance,
    LeaveRequest, LeaveType, ManualQuotaInput, RequestStatus, UpdateLeaveRequestInput,
    UpdateLeaveTypeInput,
};
use crate::database::repositories::{
    DirectoryRepository, LeaveBalanceRepository, LeaveRequestRepository, LeaveTypeRepository,
};
use crate::engine::leave::{accrue_period, count_leave_days};
use crate::engine::workflow;
use crate::error::AppError;

#[derive(Clone)]
pub struct LeaveService {
    directory: DirectoryRepository,
    leave_types: LeaveTypeRepository,
    balances: LeaveBalanceRepository,
    requests: LeaveRequestRepository,
    policies: PolicyStore,
    audit: AuditLogger,
}

impl LeaveService {
    pub fn new(
        directory: DirectoryRepository,
        leave_types: LeaveTypeRepository,
        balances: LeaveBalanceRepository,
        requests: LeaveRequestRepository,
        policies: PolicyStore,
        audit: AuditLogger,
    ) -> Self {
        Self {
            directory,
            leave_types,
            balances,
            requests,
            policies,
            audit,
        }
    }

    // ------------------------------------------------------------------
    // Leave types
    // ------------------------------------------------------------------

    pub async fn create_leave_type(
        &self,
        ctx: &RequestContext,
        input: &CreateLeaveTypeInput,
    ) -> Result<LeaveType, AppError> {
        if !ctx.actor.is_owner() {
            return Err(AppError::forbidden("only the owner may manage leave types"));
        }

        let leave_type = self.leave_types.create(ctx.company_id, input).await?;

        self.audit
            .record(
                ctx,
                actions::CREATE,
                entity::LEAVE_TYPE,
                leave_type.id,
                None,
                AuditLogger::snapshot(&leave_type),
                None,
            )
            .await;

        Ok(leave_type)
    }

    /// Policy edits affect future recomputation only; settled ledger
    /// rows keep the figures they were derived with.
    pub async fn update_leave_type(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: &UpdateLeaveTypeInput,
    ) -> Result<LeaveType, AppError> {
        if !ctx.actor.is_owner() {
            return Err(AppError::forbidden("only the owner may manage leave types"));
        }
        let existing = self.leave_type_in_company(ctx, id).await?;

        let before = AuditLogger::snapshot(&existing);
        let updated = self.leave_types.update(id, input).await?;

        self.audit
            .record(
                ctx,
                actions::UPDATE,
                entity::LEAVE_TYPE,
                updated.id,
                before,
                AuditLogger::snapshot(&updated),
                None,
            )
            .await;

        Ok(updated)
    }

    pub async fn list_leave_types(&self, ctx: &RequestContext) -> Result<Vec<LeaveType>, AppError> {
        Ok(self.leave_types.list_by_company(ctx.company_id).await?)
    }

    // ------------------------------------------------------------------
    // Balances
    // ------------------------------------------------------------------

    /// Lazily materializes the period's balance from the prior
    /// period's stored row. In manual-quota mode an existing row is
    /// authoritative input and returned verbatim.
    pub async fn get_balance(
        &self,
        ctx: &RequestContext,
        employee_id: Uuid,
        leave_type_id: Uuid,
        period_year: i32,
        period_month: u32,
    ) -> Result<LeaveBalance, AppError> {
        if !(1..=12).contains(&period_month) {
            return Err(AppError::validation("period month must be 1-12"));
        }
        let employee = self.employee_in_company(ctx, employee_id).await?;
        let leave_type = self.leave_type_in_company(ctx, leave_type_id).await?;
        let policy = self.policies.leave_policy(ctx.company_id).await?;

        let existing = self
            .balances
            .find_for_period(employee.id, leave_type.id, period_year, period_month as i32)
            .await?;

        if policy.manual_quota {
            if let Some(row) = &existing {
                return Ok(row.clone());
            }
        }

        let (prev_year, prev_month) = if period_month == 1 {
            (period_year - 1, 12)
        } else {
            (period_year, period_month as i32 - 1)
        };
        let previous = self
            .balances
            .find_for_period(employee.id, leave_type.id, prev_year, prev_month)
            .await?;

        let reference = if period_month == policy.carryover_month {
            self.balances
                .find_for_period(
                    employee.id,
                    leave_type.id,
                    period_year - 1,
                    policy.reference_month as i32,
                )
                .await?
        } else {
            None
        };

        let existing_used = existing
            .as_ref()
            .map(|b| b.used.clone())
            .unwrap_or_else(|| BigDecimal::from(0));

        let outcome = accrue_period(
            &leave_type,
            &policy,
            previous.as_ref(),
            reference.as_ref(),
            existing_used,
            period_year,
            period_month,
        );

        Ok(self
            .balances
            .upsert(
                employee.id,
                leave_type.id,
                period_year,
                period_month as i32,
                &outcome,
            )
            .await?)
    }

    pub async fn set_manual_quota(
        &self,
        ctx: &RequestContext,
        input: &ManualQuotaInput,
    ) -> Result<LeaveBalance, AppError> {
        if !ctx.actor.is_owner() {
            return Err(AppError::forbidden("only the owner may set quotas"));
        }
        let employee = self.employee_in_company(ctx, input.employee_id).await?;
        let leave_type = self.leave_type_in_company(ctx, input.leave_type_id).await?;

        let balance = self
            .balances
            .set_manual_quota(
                employee.id,
                leave_type.id,
                input.period_year,
                input.period_month,
                &input.balance,
                input.used.as_ref(),
            )
            .await?;

        self.audit
            .record(
                ctx,
                actions::SET_QUOTA,
                entity::LEAVE_BALANCE,
                balance.id,
                None,
                AuditLogger::snapshot(&balance),
                None,
            )
            .await;

        Ok(balance)
    }

    pub async fn balances_for_year(
        &self,
        ctx: &RequestContext,
        employee_id: Uuid,
        period_year: i32,
    ) -> Result<Vec<LeaveBalance>, AppError> {
        let employee = self.employee_in_company(ctx, employee_id).await?;
        Ok(self
            .balances
            .list_for_employee_year(employee.id, period_year)
            .await?)
    }

    // ------------------------------------------------------------------
    // Requests
    // ------------------------------------------------------------------

    pub async fn create_request(
        &self,
        ctx: &RequestContext,
        input: &CreateLeaveRequestInput,
    ) -> Result<LeaveRequest, AppError> {
        let employee = self.employee_in_company(ctx, input.employee_id).await?;
        self.ensure_may_submit_for(ctx, &employee)?;

        let leave_type = self.leave_type_in_company(ctx, input.leave_type_id).await?;
        if !leave_type.is_active {
            return Err(AppError::validation("leave type is no longer active"));
        }
        if leave_type.requires_attachment && input.attachment_url.is_none() {
            return Err(AppError::validation(
                "this leave type requires an attachment",
            ));
        }
        if input.end_date < input.start_date {
            return Err(AppError::validation("leave must end on or after its start"));
        }

        let policy = self.policies.leave_policy(ctx.company_id).await?;
        let days = count_leave_days(input.start_date, input.end_date, &policy);
        if days == 0 {
            return Err(AppError::validation("leave range covers no working days"));
        }

        let overlapping = self
            .requests
            .find_overlapping(employee.id, input.start_date, input.end_date, None)
            .await?;
        if !overlapping.is_empty() {
            return Err(AppError::conflict(
                "an overlapping leave request already exists",
            ));
        }

        let request = self
            .requests
            .create(
                ctx.company_id,
                ctx.actor.id,
                ctx.actor.role,
                &BigDecimal::from(days),
                input,
            )
            .await?;

        self.audit
            .record(
                ctx,
                actions::CREATE,
                entity::LEAVE_REQUEST,
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
        input: &UpdateLeaveRequestInput,
    ) -> Result<LeaveRequest, AppError> {
        let request = self.request_in_company(ctx, id).await?;
        workflow::ensure_pending(request.status, "leave request")?;
        workflow::ensure_requester(request.requested_by, ctx.actor.id, "leave request")?;
        if input.end_date < input.start_date {
            return Err(AppError::validation("leave must end on or after its start"));
        }

        let policy = self.policies.leave_policy(ctx.company_id).await?;
        let days = count_leave_days(input.start_date, input.end_date, &policy);
        if days == 0 {
            return Err(AppError::validation("leave range covers no working days"));
        }

        let overlapping = self
            .requests
            .find_overlapping(
                request.employee_id,
                input.start_date,
                input.end_date,
                Some(request.id),
            )
            .await?;
        if !overlapping.is_empty() {
            return Err(AppError::conflict(
                "an overlapping leave request already exists",
            ));
        }

        let before = AuditLogger::snapshot(&request);
        let updated = self
            .requests
            .update_content(id, &BigDecimal::from(days), input)
            .await?;

        self.audit
            .record(
                ctx,
                actions::UPDATE,
                entity::LEAVE_REQUEST,
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
        workflow::ensure_pending(request.status, "leave request")?;
        workflow::ensure_requester(request.requested_by, ctx.actor.id, "leave request")?;

        self.requests.delete(id).await?;

        self.audit
            .record(
                ctx,
                actions::DELETE,
                entity::LEAVE_REQUEST,
                id,
                AuditLogger::snapshot(&request),
                None,
                None,
            )
            .await;

        Ok(())
    }

    /// Approval settles by debiting the period balance. The debit runs
    /// after the status flip; a failure there leaves the request
    /// approved-but-unsettled and is surfaced as an internal error.
    pub async fn approve_request(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<LeaveRequest, AppError> {
        let request = self.request_in_company(ctx, id).await?;
        workflow::ensure_pending(request.status, "leave request")?;
        let employee = self.employee_in_company(ctx, request.employee_id).await?;
        workflow::authorize_decision(
            request.requester_role,
            employee.manager_id,
            ctx.actor.id,
            ctx.actor.role,
        )?;

        let balance = self
            .get_balance(
                ctx,
                request.employee_id,
                request.leave_type_id,
                request.start_date.year(),
                request.start_date.month(),
            )
            .await?;
        if balance.balance < request.days {
            return Err(AppError::validation(format!(
                "insufficient leave balance: {} needed, {} available",
                request.days, balance.balance
            )));
        }

        let before = AuditLogger::snapshot(&request);
        let approved = self
            .requests
            .decide(id, RequestStatus::Approved, ctx.actor.id, None)
            .await?;

        if let Err(err) = self.balances.debit(balance.id, &approved.days).await {
            log::error!(
                "leave request {} approved but balance {} was not debited: {}",
                approved.id,
                balance.id,
                err
            );
            return Err(AppError::internal(
                "request approved but balance settlement failed",
            ));
        }

        self.audit
            .record(
                ctx,
                actions::APPROVE,
                entity::LEAVE_REQUEST,
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
    ) -> Result<LeaveRequest, AppError> {
        let request = self.request_in_company(ctx, id).await?;
        workflow::ensure_pending(request.status, "leave request")?;
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
                input.reason.clone(),
            )
            .await?;

        self.audit
            .record(
                ctx,
                actions::REJECT,
                entity::LEAVE_REQUEST,
                rejected.id,
                before,
                AuditLogger::snapshot(&rejected),
                input.reason.clone(),
            )
            .await;

        Ok(rejected)
    }

    pub async fn list_requests(
        &self,
        ctx: &RequestContext,
        employee_id: Uuid,
        status: Option<RequestStatus>,
    ) -> Result<Vec<LeaveRequest>, AppError> {
        let employee = self.employee_in_company(ctx, employee_id).await?;
        if ctx.actor.id != employee.id && !ctx.actor.is_owner() && !ctx.actor.is_manager() {
            return Err(AppError::forbidden("cannot view other employees' requests"));
        }
        Ok(self.requests.list_for_employee(employee.id, status).await?)
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

    async fn leave_type_in_company(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<LeaveType, AppError> {
        self.leave_types
            .find_by_id(id)
            .await?
            .filter(|t| t.company_id == ctx.company_id)
            .ok_or_else(|| AppError::not_found("leave type not found"))
    }

    async fn request_in_company(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<LeaveRequest, AppError> {
        self.requests
            .find_by_id(id)
            .await?
            .filter(|r| r.company_id == ctx.company_id)
            .ok_or_else(|| AppError::not_found("leave request not found"))
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
