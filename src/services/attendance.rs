use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::audit_logger::{actions, AuditLogger};
use super::context::RequestContext;
use super::policy_store::PolicyStore;
use crate::database::models::audit::entity;
use crate::database::models::{
    AdjustmentInput, AdjustmentRequest, AttendanceRecord, ClockInput, Company,
    CreateShiftScheduleInput, DecisionInput, Employee, EmployeeRole, RequestStatus, ShiftSchedule,
};
use crate::database::repositories::{
    AdjustmentRepository, AttendanceRepository, DirectoryRepository, ScheduleRepository,
};
use crate::engine::attendance::{compute_duration, derive_status, late_minutes};
use crate::engine::calendar::{self, BusinessCalendar};
use crate::engine::geofence::{self, GeoPoint};
use crate::engine::workflow;
use crate::error::AppError;

#[derive(Clone)]
pub struct AttendanceService {
    directory: DirectoryRepository,
    records: AttendanceRepository,
    adjustments: AdjustmentRepository,
    schedules: ScheduleRepository,
    policies: PolicyStore,
    audit: AuditLogger,
}

impl AttendanceService {
    pub fn new(
        directory: DirectoryRepository,
        records: AttendanceRepository,
        adjustments: AdjustmentRepository,
        schedules: ScheduleRepository,
        policies: PolicyStore,
        audit: AuditLogger,
    ) -> Self {
        Self {
            directory,
            records,
            adjustments,
            schedules,
            policies,
            audit,
        }
    }

    /// Opens the day's record. Fails with Conflict when a record for
    /// the business day already exists, before and behind the unique
    /// constraint that settles races.
    pub async fn clock_in(
        &self,
        ctx: &RequestContext,
        input: &ClockInput,
    ) -> Result<AttendanceRecord, AppError> {
        let employee = self.employee_in_company(ctx, input.employee_id).await?;
        if employee.id != ctx.actor.id {
            return Err(AppError::forbidden("you can only clock in for yourself"));
        }

        let company = self.company(ctx).await?;
        self.check_geofence(&company, input)?;

        let calendar = BusinessCalendar::new(company.timezone_offset_hours);
        let now = Utc::now();
        let today = calendar.normalize_to_business_day(now);

        if let Some(existing) = self.records.find_for_day(employee.id, today).await? {
            if existing.clock_out.is_some() {
                return Err(AppError::conflict("already clocked out today"));
            }
            return Err(AppError::conflict("already clocked in today"));
        }

        let notes = self
            .annotate_unscheduled(ctx, &employee, &calendar, today, input.notes.clone())
            .await?;

        let record = self
            .records
            .create_clock_in(
                employee.id,
                ctx.company_id,
                today,
                now,
                input.latitude,
                input.longitude,
                notes,
            )
            .await?;

        self.audit
            .record(
                ctx,
                actions::CLOCK_IN,
                entity::ATTENDANCE_RECORD,
                record.id,
                None,
                AuditLogger::snapshot(&record),
                None,
            )
            .await;

        Ok(record)
    }

    /// Closes the day's record, deriving duration and settled status.
    pub async fn clock_out(
        &self,
        ctx: &RequestContext,
        input: &ClockInput,
    ) -> Result<AttendanceRecord, AppError> {
        let employee = self.employee_in_company(ctx, input.employee_id).await?;
        if employee.id != ctx.actor.id {
            return Err(AppError::forbidden("you can only clock out for yourself"));
        }

        let company = self.company(ctx).await?;
        self.check_geofence(&company, input)?;

        let calendar = BusinessCalendar::new(company.timezone_offset_hours);
        let now = Utc::now();
        let today = calendar.normalize_to_business_day(now);

        let record = self
            .records
            .find_for_day(employee.id, today)
            .await?
            .ok_or_else(|| AppError::conflict("not clocked in today"))?;
        if record.clock_out.is_some() {
            return Err(AppError::conflict("already clocked out today"));
        }
        let Some(clock_in) = record.clock_in else {
            return Err(AppError::conflict("not clocked in today"));
        };

        let rules = self.policies.attendance_rules(ctx.company_id).await?;
        let duration = compute_duration(clock_in, now, &rules);

        let late = match self.earliest_slot_start(&employee, today).await? {
            Some(expected) => late_minutes(
                calendar.local_time(clock_in),
                expected,
                rules.grace_period_minutes,
            ),
            None => 0,
        };
        let status = derive_status(duration, late, &rules);

        let notes = merge_notes(record.notes.clone(), input.notes.clone());
        let before = AuditLogger::snapshot(&record);
        let updated = self
            .records
            .set_clock_out(
                record.id,
                now,
                input.latitude,
                input.longitude,
                duration,
                status,
                notes,
            )
            .await?;

        self.audit
            .record(
                ctx,
                actions::CLOCK_OUT,
                entity::ATTENDANCE_RECORD,
                updated.id,
                before,
                AuditLogger::snapshot(&updated),
                None,
            )
            .await;

        Ok(updated)
    }

    pub async fn record_for_day(
        &self,
        ctx: &RequestContext,
        employee_id: Uuid,
        work_date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AppError> {
        let employee = self.employee_in_company(ctx, employee_id).await?;
        Ok(self.records.find_for_day(employee.id, work_date).await?)
    }

    // ------------------------------------------------------------------
    // Adjustment requests
    // ------------------------------------------------------------------

    pub async fn submit_adjustment(
        &self,
        ctx: &RequestContext,
        input: &AdjustmentInput,
    ) -> Result<AdjustmentRequest, AppError> {
        let record = self.record_in_company(ctx, input.attendance_record_id).await?;
        let employee = self.employee_in_company(ctx, record.employee_id).await?;
        self.ensure_may_submit_for(ctx, &employee)?;
        validate_clock_pair(input)?;

        if self
            .adjustments
            .find_active_for_record(record.id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(
                "an active adjustment request already exists for this record",
            ));
        }

        let request = self
            .adjustments
            .create(
                record.employee_id,
                ctx.company_id,
                ctx.actor.id,
                ctx.actor.role,
                input,
            )
            .await?;

        self.audit
            .record(
                ctx,
                actions::CREATE,
                entity::ADJUSTMENT_REQUEST,
                request.id,
                None,
                AuditLogger::snapshot(&request),
                None,
            )
            .await;

        Ok(request)
    }

    pub async fn update_adjustment(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: &AdjustmentInput,
    ) -> Result<AdjustmentRequest, AppError> {
        let request = self.adjustment_in_company(ctx, id).await?;
        workflow::ensure_pending(request.status, "adjustment request")?;
        workflow::ensure_requester(request.requested_by, ctx.actor.id, "adjustment request")?;
        if input.attendance_record_id != request.attendance_record_id {
            return Err(AppError::validation(
                "an adjustment request cannot move to a different attendance record",
            ));
        }
        validate_clock_pair(input)?;

        let before = AuditLogger::snapshot(&request);
        let updated = self.adjustments.update_content(id, input).await?;

        self.audit
            .record(
                ctx,
                actions::UPDATE,
                entity::ADJUSTMENT_REQUEST,
                updated.id,
                before,
                AuditLogger::snapshot(&updated),
                None,
            )
            .await;

        Ok(updated)
    }

    pub async fn delete_adjustment(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        let request = self.adjustment_in_company(ctx, id).await?;
        workflow::ensure_pending(request.status, "adjustment request")?;
        workflow::ensure_requester(request.requested_by, ctx.actor.id, "adjustment request")?;

        self.adjustments.delete(id).await?;

        self.audit
            .record(
                ctx,
                actions::DELETE,
                entity::ADJUSTMENT_REQUEST,
                id,
                AuditLogger::snapshot(&request),
                None,
                None,
            )
            .await;

        Ok(())
    }

    /// Rejected requests alone may re-enter pending, overwritten in
    /// place by their original requester.
    pub async fn resubmit_adjustment(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: &AdjustmentInput,
    ) -> Result<AdjustmentRequest, AppError> {
        let request = self.adjustment_in_company(ctx, id).await?;
        workflow::ensure_rejected(request.status, "adjustment request")?;
        workflow::ensure_requester(request.requested_by, ctx.actor.id, "adjustment request")?;
        if input.attendance_record_id != request.attendance_record_id {
            return Err(AppError::validation(
                "an adjustment request cannot move to a different attendance record",
            ));
        }
        validate_clock_pair(input)?;

        let before = AuditLogger::snapshot(&request);
        let resubmitted = self.adjustments.resubmit(id, input).await?;

        self.audit
            .record(
                ctx,
                actions::RESUBMIT,
                entity::ADJUSTMENT_REQUEST,
                resubmitted.id,
                before,
                AuditLogger::snapshot(&resubmitted),
                None,
            )
            .await;

        Ok(resubmitted)
    }

    /// Approval settles by merging the adjusted times into the record
    /// and recomputing duration and status. The settlement write runs
    /// after the status flip; a failure there leaves the request
    /// approved-but-unsettled and is surfaced as an internal error.
    pub async fn approve_adjustment(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<AdjustmentRequest, AppError> {
        let request = self.adjustment_in_company(ctx, id).await?;
        workflow::ensure_pending(request.status, "adjustment request")?;
        let employee = self.employee_in_company(ctx, request.employee_id).await?;
        workflow::authorize_decision(
            request.requester_role,
            employee.manager_id,
            ctx.actor.id,
            ctx.actor.role,
        )?;

        let record = self
            .record_in_company(ctx, request.attendance_record_id)
            .await?;
        let company = self.company(ctx).await?;
        let calendar = BusinessCalendar::new(company.timezone_offset_hours);
        let rules = self.policies.attendance_rules(ctx.company_id).await?;

        let before = AuditLogger::snapshot(&request);
        let approved = self
            .adjustments
            .decide(id, RequestStatus::Approved, ctx.actor.id, None)
            .await?;

        let duration = compute_duration(
            approved.requested_clock_in,
            approved.requested_clock_out,
            &rules,
        );
        let late = match self
            .earliest_slot_start(&employee, record.work_date)
            .await?
        {
            Some(expected) => late_minutes(
                calendar.local_time(approved.requested_clock_in),
                expected,
                rules.grace_period_minutes,
            ),
            None => 0,
        };
        let status = derive_status(duration, late, &rules);

        if let Err(err) = self
            .records
            .apply_adjustment(
                record.id,
                approved.requested_clock_in,
                approved.requested_clock_out,
                duration,
                status,
                approved.id,
            )
            .await
        {
            log::error!(
                "adjustment {} approved but attendance record {} was not updated: {}",
                approved.id,
                record.id,
                err
            );
            return Err(AppError::internal(
                "request approved but attendance settlement failed",
            ));
        }

        self.audit
            .record(
                ctx,
                actions::APPROVE,
                entity::ADJUSTMENT_REQUEST,
                approved.id,
                before,
                AuditLogger::snapshot(&approved),
                None,
            )
            .await;

        Ok(approved)
    }

    pub async fn reject_adjustment(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: &DecisionInput,
    ) -> Result<AdjustmentRequest, AppError> {
        let reason = input
            .reason
            .clone()
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| AppError::validation("a rejection reason is required"))?;

        let request = self.adjustment_in_company(ctx, id).await?;
        workflow::ensure_pending(request.status, "adjustment request")?;
        let employee = self.employee_in_company(ctx, request.employee_id).await?;
        workflow::authorize_decision(
            request.requester_role,
            employee.manager_id,
            ctx.actor.id,
            ctx.actor.role,
        )?;

        let before = AuditLogger::snapshot(&request);
        let rejected = self
            .adjustments
            .decide(id, RequestStatus::Rejected, ctx.actor.id, Some(reason.clone()))
            .await?;

        self.audit
            .record(
                ctx,
                actions::REJECT,
                entity::ADJUSTMENT_REQUEST,
                rejected.id,
                before,
                AuditLogger::snapshot(&rejected),
                Some(reason),
            )
            .await;

        Ok(rejected)
    }

    // ------------------------------------------------------------------
    // Shift schedules
    // ------------------------------------------------------------------

    pub async fn create_schedule(
        &self,
        ctx: &RequestContext,
        input: &CreateShiftScheduleInput,
    ) -> Result<ShiftSchedule, AppError> {
        if !ctx.actor.is_owner() && !ctx.actor.is_manager() {
            return Err(AppError::forbidden("only managers may manage schedules"));
        }
        let employee = self.employee_in_company(ctx, input.employee_id).await?;
        if input.start_time >= input.end_time {
            return Err(AppError::validation("shift must end after it starts"));
        }

        let schedule = self.schedules.create(employee.company_id, input).await?;

        self.audit
            .record(
                ctx,
                actions::CREATE,
                entity::SHIFT_SCHEDULE,
                schedule.id,
                None,
                AuditLogger::snapshot(&schedule),
                None,
            )
            .await;

        Ok(schedule)
    }

    pub async fn delete_schedule(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        if !ctx.actor.is_owner() && !ctx.actor.is_manager() {
            return Err(AppError::forbidden("only managers may manage schedules"));
        }
        let schedule = self
            .schedules
            .find_by_id(id)
            .await?
            .filter(|s| s.company_id == ctx.company_id)
            .ok_or_else(|| AppError::not_found("shift schedule not found"))?;

        self.schedules.delete(schedule.id).await?;

        self.audit
            .record(
                ctx,
                actions::DELETE,
                entity::SHIFT_SCHEDULE,
                schedule.id,
                AuditLogger::snapshot(&schedule),
                None,
                None,
            )
            .await;

        Ok(())
    }

    pub async fn list_schedules(
        &self,
        ctx: &RequestContext,
        employee_id: Uuid,
    ) -> Result<Vec<ShiftSchedule>, AppError> {
        let employee = self.employee_in_company(ctx, employee_id).await?;
        Ok(self.schedules.list_for_employee(employee.id).await?)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn company(&self, ctx: &RequestContext) -> Result<Company, AppError> {
        self.directory
            .find_company(ctx.company_id)
            .await?
            .ok_or_else(|| AppError::not_found("company not found"))
    }

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

    async fn record_in_company(
        &self,
        ctx: &RequestContext,
        record_id: Uuid,
    ) -> Result<AttendanceRecord, AppError> {
        self.records
            .find_by_id(record_id)
            .await?
            .filter(|r| r.company_id == ctx.company_id)
            .ok_or_else(|| AppError::not_found("attendance record not found"))
    }

    async fn adjustment_in_company(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<AdjustmentRequest, AppError> {
        self.adjustments
            .find_by_id(id)
            .await?
            .filter(|r| r.company_id == ctx.company_id)
            .ok_or_else(|| AppError::not_found("adjustment request not found"))
    }

    fn ensure_may_submit_for(
        &self,
        ctx: &RequestContext,
        employee: &Employee,
    ) -> Result<(), AppError> {
        if ctx.actor.id == employee.id || ctx.actor.role == EmployeeRole::Owner {
            return Ok(());
        }
        if ctx.actor.role == EmployeeRole::Manager && employee.manager_id == Some(ctx.actor.id) {
            return Ok(());
        }
        Err(AppError::forbidden(
            "you can only submit requests for yourself or your direct reports",
        ))
    }

    fn check_geofence(&self, company: &Company, input: &ClockInput) -> Result<(), AppError> {
        let Some(fence) = geofence::company_geofence(company)? else {
            return Ok(());
        };
        let (Some(lat), Some(lng)) = (input.latitude, input.longitude) else {
            return Err(AppError::validation(
                "location is required while geofencing is enabled",
            ));
        };
        if !geofence::is_within_radius(GeoPoint { lat, lng }, fence.center, fence.radius_meters) {
            return Err(AppError::validation("outside the company geofence"));
        }
        Ok(())
    }

    /// Schedule precondition: owners clock freely; everyone else needs
    /// a slot today. Clocking outside the slot window is allowed but
    /// annotated, so unscheduled work is tracked rather than blocked.
    async fn annotate_unscheduled(
        &self,
        ctx: &RequestContext,
        employee: &Employee,
        calendar: &BusinessCalendar,
        today: NaiveDate,
        notes: Option<String>,
    ) -> Result<Option<String>, AppError> {
        if ctx.actor.role == EmployeeRole::Owner {
            return Ok(notes);
        }

        let dow = calendar::day_of_week(today) as i16;
        let slots = self.schedules.find_for_day(employee.id, today, dow).await?;
        if slots.is_empty() {
            return Err(AppError::validation("no shift scheduled for today"));
        }

        let local = calendar.local_time(Utc::now());
        let within = slots
            .iter()
            .any(|s| s.start_time <= local && local <= s.end_time);
        if within {
            Ok(notes)
        } else {
            Ok(Some(match notes {
                Some(existing) => format!("{} [unscheduled overtime]", existing),
                None => "[unscheduled overtime]".to_string(),
            }))
        }
    }

    async fn earliest_slot_start(
        &self,
        employee: &Employee,
        date: NaiveDate,
    ) -> Result<Option<chrono::NaiveTime>, AppError> {
        let dow = calendar::day_of_week(date) as i16;
        let slots = self.schedules.find_for_day(employee.id, date, dow).await?;
        Ok(slots.iter().map(|s| s.start_time).min())
    }
}

fn merge_notes(existing: Option<String>, extra: Option<String>) -> Option<String> {
    match (existing, extra) {
        (Some(a), Some(b)) => Some(format!("{} {}", a, b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

fn validate_clock_pair(input: &AdjustmentInput) -> Result<(), AppError> {
    if input.requested_clock_out <= input.requested_clock_in {
        return Err(AppError::validation("clock-out must come after clock-in"));
    }
    Ok(())
}
