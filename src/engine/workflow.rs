use uuid::Uuid;

use crate::database::models::{EmployeeRole, RequestStatus};
use crate::error::AppError;

/// Guard rails shared by every adjustable request kind. Services call
/// these before touching state; persistence happens only after all
/// guards pass, so validation-stage failures leave nothing behind.

pub fn ensure_pending(status: RequestStatus, noun: &str) -> Result<(), AppError> {
    if status != RequestStatus::Pending {
        return Err(AppError::conflict(format!(
            "{} has already been processed",
            noun
        )));
    }
    Ok(())
}

pub fn ensure_rejected(status: RequestStatus, noun: &str) -> Result<(), AppError> {
    if status != RequestStatus::Rejected {
        return Err(AppError::conflict(format!(
            "{} can only be resubmitted after rejection",
            noun
        )));
    }
    Ok(())
}

/// Updates and deletions belong to the original requester alone.
pub fn ensure_requester(requested_by: Uuid, actor_id: Uuid, noun: &str) -> Result<(), AppError> {
    if requested_by != actor_id {
        return Err(AppError::forbidden(format!(
            "only the original requester may modify this {}",
            noun
        )));
    }
    Ok(())
}

/// Escalation rule for approve/reject:
/// - the owner may always decide;
/// - a manager-originated request escalates past peer managers;
/// - otherwise a manager decides only for their direct reports.
pub fn authorize_decision(
    requester_role: EmployeeRole,
    employee_manager_id: Option<Uuid>,
    actor_id: Uuid,
    actor_role: EmployeeRole,
) -> Result<(), AppError> {
    if actor_role == EmployeeRole::Owner {
        return Ok(());
    }
    if requester_role == EmployeeRole::Manager {
        return Err(AppError::forbidden(
            "manager-submitted requests require owner approval",
        ));
    }
    if actor_role == EmployeeRole::Manager {
        if employee_manager_id == Some(actor_id) {
            return Ok(());
        }
        return Err(AppError::forbidden(
            "managers may only decide requests for their direct reports",
        ));
    }
    Err(AppError::forbidden("insufficient role to decide requests"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn only_pending_can_be_processed() {
        assert!(ensure_pending(RequestStatus::Pending, "request").is_ok());
        let err = ensure_pending(RequestStatus::Approved, "request").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn resubmission_requires_rejected_state() {
        assert!(ensure_rejected(RequestStatus::Rejected, "request").is_ok());
        assert!(ensure_rejected(RequestStatus::Pending, "request").is_err());
    }

    #[test]
    fn requester_gate() {
        let requester = Uuid::new_v4();
        assert!(ensure_requester(requester, requester, "request").is_ok());
        let err = ensure_requester(requester, Uuid::new_v4(), "request").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn owner_always_decides() {
        let outcome = authorize_decision(
            EmployeeRole::Manager,
            None,
            Uuid::new_v4(),
            EmployeeRole::Owner,
        );
        assert!(outcome.is_ok());
    }

    #[test]
    fn manager_originated_requests_escalate_to_owner() {
        let manager = Uuid::new_v4();
        let err = authorize_decision(
            EmployeeRole::Manager,
            Some(manager),
            manager,
            EmployeeRole::Manager,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn manager_decides_only_for_direct_reports() {
        let manager = Uuid::new_v4();
        assert!(
            authorize_decision(
                EmployeeRole::Employee,
                Some(manager),
                manager,
                EmployeeRole::Manager,
            )
            .is_ok()
        );
        let err = authorize_decision(
            EmployeeRole::Employee,
            Some(Uuid::new_v4()),
            manager,
            EmployeeRole::Manager,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn plain_employees_never_decide() {
        let err = authorize_decision(
            EmployeeRole::Employee,
            None,
            Uuid::new_v4(),
            EmployeeRole::Employee,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }
}
