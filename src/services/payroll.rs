use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use super::audit_logger::{actions, AuditLogger};
use super::context::RequestContext;
use super::policy_store::PolicyStore;
use crate::database::models::audit::entity;
use crate::database::models::{
    Employee, PayrollItem, PayrollItemOverride, PayrollRun, PayrollRunStatus,
};
use crate::database::repositories::{
    AttendanceRepository, DirectoryRepository, NewPayrollItem, OvertimeRepository,
    PayrollRepository,
};
use crate::engine::payroll::{compute_pay, rederive_item_totals, ManualFigures};
use crate::engine::policy::PayrollConfig;
use crate::error::AppError;

#[derive(Clone)]
pub struct PayrollService {
    directory: DirectoryRepository,
    attendance: AttendanceRepository,
    overtime: OvertimeRepository,
    payroll: PayrollRepository,
    policies: PolicyStore,
    audit: AuditLogger,
}

impl PayrollService {
    pub fn new(
        directory: DirectoryRepository,
        attendance: AttendanceRepository,
        overtime: OvertimeRepository,
        payroll: PayrollRepository,
        policies: PolicyStore,
        audit: AuditLogger,
    ) -> Self {
        Self {
            directory,
            attendance,
            overtime,
            payroll,
            policies,
            audit,
        }
    }

    /// Computes one item per active employee and creates the run with
    /// them in a single transaction. A duplicate period is a conflict,
    /// pre-checked and enforced by the unique key for races.
    pub async fn create_run(
        &self,
        ctx: &RequestContext,
        period_year: i32,
        period_month: u32,
    ) -> Result<(PayrollRun, Vec<PayrollItem>), AppError> {
        if !ctx.actor.is_owner() {
            return Err(AppError::forbidden("only the owner may run payroll"));
        }
        let (from, to) = period_bounds(period_year, period_month)?;

        if self
            .payroll
            .find_run_for_period(ctx.company_id, period_year, period_month as i32)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(
                "a payroll run for this period already exists",
            ));
        }

        let config = self.policies.payroll_config(ctx.company_id).await?;
        let employees = self.directory.list_active_employees(ctx.company_id).await?;

        let items = self.compute_items(&employees, &config, from, to).await?;
        let (run, items) = self
            .payroll
            .create_run_with_items(
                ctx.company_id,
                period_year,
                period_month as i32,
                ctx.actor.id,
                items,
            )
            .await?;

        self.audit
            .record(
                ctx,
                actions::CREATE,
                entity::PAYROLL_RUN,
                run.id,
                None,
                AuditLogger::snapshot(&run),
                None,
            )
            .await;

        Ok((run, items))
    }

    /// Recomputes every item of a draft run from current records and
    /// policy. Locked and paid runs are immutable.
    pub async fn recompute_run(
        &self,
        ctx: &RequestContext,
        run_id: Uuid,
    ) -> Result<(PayrollRun, Vec<PayrollItem>), AppError> {
        if !ctx.actor.is_owner() {
            return Err(AppError::forbidden("only the owner may run payroll"));
        }
        let run = self.run_in_company(ctx, run_id).await?;
        ensure_mutable(&run)?;
        let (from, to) = period_bounds(run.period_year, run.period_month as u32)?;

        let config = self.policies.payroll_config(ctx.company_id).await?;
        let employees = self.directory.list_active_employees(ctx.company_id).await?;

        let before = AuditLogger::snapshot(&run);
        let items = self.compute_items(&employees, &config, from, to).await?;
        let (run, items) = self.payroll.replace_items(run.id, items).await?;

        self.audit
            .record(
                ctx,
                actions::UPDATE,
                entity::PAYROLL_RUN,
                run.id,
                before,
                AuditLogger::snapshot(&run),
                None,
            )
            .await;

        Ok((run, items))
    }

    /// Manual override of one item's adjustable lines. Gross and net
    /// re-derive from the stored base/overtime/contribution figures,
    /// and the run total re-aggregates from its items.
    pub async fn override_item(
        &self,
        ctx: &RequestContext,
        item_id: Uuid,
        ov: &PayrollItemOverride,
    ) -> Result<(PayrollItem, PayrollRun), AppError> {
        if !ctx.actor.is_owner() {
            return Err(AppError::forbidden("only the owner may edit payroll"));
        }
        let item = self
            .payroll
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::not_found("payroll item not found"))?;
        let run = self.run_in_company(ctx, item.payroll_run_id).await?;
        ensure_mutable(&run)?;

        let totals = rederive_item_totals(&item, ov);
        let before = AuditLogger::snapshot(&item);
        let (item, run) = self
            .payroll
            .apply_item_override(item.id, run.id, &totals)
            .await?;

        self.audit
            .record(
                ctx,
                actions::OVERRIDE,
                entity::PAYROLL_ITEM,
                item.id,
                before,
                AuditLogger::snapshot(&item),
                None,
            )
            .await;

        Ok((item, run))
    }

    pub async fn lock_run(&self, ctx: &RequestContext, run_id: Uuid) -> Result<PayrollRun, AppError> {
        if !ctx.actor.is_owner() {
            return Err(AppError::forbidden("only the owner may lock payroll"));
        }
        let run = self.run_in_company(ctx, run_id).await?;
        if run.status != PayrollRunStatus::Draft {
            return Err(AppError::conflict("only draft runs can be locked"));
        }

        let before = AuditLogger::snapshot(&run);
        let locked = self
            .payroll
            .update_run_status(run.id, PayrollRunStatus::Locked)
            .await?;

        self.audit
            .record(
                ctx,
                actions::LOCK,
                entity::PAYROLL_RUN,
                locked.id,
                before,
                AuditLogger::snapshot(&locked),
                None,
            )
            .await;

        Ok(locked)
    }

    pub async fn mark_paid(&self, ctx: &RequestContext, run_id: Uuid) -> Result<PayrollRun, AppError> {
        if !ctx.actor.is_owner() {
            return Err(AppError::forbidden("only the owner may mark payroll paid"));
        }
        let run = self.run_in_company(ctx, run_id).await?;
        if run.status != PayrollRunStatus::Locked {
            return Err(AppError::conflict("only locked runs can be marked paid"));
        }

        let before = AuditLogger::snapshot(&run);
        let paid = self
            .payroll
            .update_run_status(run.id, PayrollRunStatus::Paid)
            .await?;

        self.audit
            .record(
                ctx,
                actions::MARK_PAID,
                entity::PAYROLL_RUN,
                paid.id,
                before,
                AuditLogger::snapshot(&paid),
                None,
            )
            .await;

        Ok(paid)
    }

    /// Deleting a run cascades to its items. Locked and paid runs are
    /// terminal and cannot be deleted.
    pub async fn delete_run(&self, ctx: &RequestContext, run_id: Uuid) -> Result<(), AppError> {
        if !ctx.actor.is_owner() {
            return Err(AppError::forbidden("only the owner may delete payroll"));
        }
        let run = self.run_in_company(ctx, run_id).await?;
        ensure_mutable(&run)?;

        self.payroll.delete_run(run.id).await?;

        self.audit
            .record(
                ctx,
                actions::DELETE,
                entity::PAYROLL_RUN,
                run.id,
                AuditLogger::snapshot(&run),
                None,
                None,
            )
            .await;

        Ok(())
    }

    pub async fn get_run(
        &self,
        ctx: &RequestContext,
        run_id: Uuid,
    ) -> Result<(PayrollRun, Vec<PayrollItem>), AppError> {
        let run = self.run_in_company(ctx, run_id).await?;
        let items = self.payroll.list_items(run.id).await?;
        Ok((run, items))
    }

    pub async fn list_runs(&self, ctx: &RequestContext) -> Result<Vec<PayrollRun>, AppError> {
        Ok(self.payroll.list_runs(ctx.company_id).await?)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn compute_items(
        &self,
        employees: &[Employee],
        config: &PayrollConfig,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NewPayrollItem>, AppError> {
        let manual = ManualFigures::default();
        let mut items = Vec::with_capacity(employees.len());
        for employee in employees {
            let records = self.attendance.list_for_period(employee.id, from, to).await?;
            let approved_overtime = self
                .overtime
                .list_approved_for_period(employee.id, from, to)
                .await?;
            let computation = compute_pay(employee, &records, &approved_overtime, config, &manual);
            items.push(NewPayrollItem {
                employee_id: employee.id,
                computation,
            });
        }
        Ok(items)
    }

    async fn run_in_company(
        &self,
        ctx: &RequestContext,
        run_id: Uuid,
    ) -> Result<PayrollRun, AppError> {
        self.payroll
            .find_run_by_id(run_id)
            .await?
            .filter(|r| r.company_id == ctx.company_id)
            .ok_or_else(|| AppError::not_found("payroll run not found"))
    }
}

fn ensure_mutable(run: &PayrollRun) -> Result<(), AppError> {
    if !run.status.is_mutable() {
        return Err(AppError::conflict(format!(
            "payroll run is {} and cannot be modified",
            run.status
        )));
    }
    Ok(())
}

fn period_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AppError> {
    let from = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::validation("invalid payroll period"))?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| AppError::validation("invalid payroll period"))?;
    let to = next_month
        .pred_opt()
        .ok_or_else(|| AppError::validation("invalid payroll period"))?;
    debug_assert_eq!(from.month(), month);
    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn period_bounds_cover_whole_months() {
        let (from, to) = period_bounds(2026, 2).unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());

        let (from, to) = period_bounds(2026, 12).unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2026, 12, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
    }

    #[test]
    fn invalid_period_is_rejected() {
        assert!(period_bounds(2026, 13).is_err());
        assert!(period_bounds(2026, 0).is_err());
    }

    #[test]
    fn locked_and_paid_runs_refuse_mutation() {
        use crate::error::ErrorKind;
        use bigdecimal::BigDecimal;
        use chrono::Utc;
        use uuid::Uuid;

        let run = |status| PayrollRun {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            period_year: 2026,
            period_month: 1,
            status,
            total_amount: BigDecimal::from(0),
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(ensure_mutable(&run(PayrollRunStatus::Draft)).is_ok());
        assert!(ensure_mutable(&run(PayrollRunStatus::Processing)).is_ok());
        for status in [PayrollRunStatus::Locked, PayrollRunStatus::Paid] {
            let err = ensure_mutable(&run(status)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Conflict);
        }
    }
}
