use pretty_assertions::assert_eq;
use uuid::Uuid;

use timekeeper::database::models::{EmployeeRole, RequestStatus};
use timekeeper::engine::workflow::{
    authorize_decision, ensure_pending, ensure_rejected, ensure_requester,
};
use timekeeper::ErrorKind;

#[test]
fn decided_requests_cannot_be_touched_again() {
    for status in [RequestStatus::Approved, RequestStatus::Rejected] {
        let err = ensure_pending(status, "leave request").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
    assert!(ensure_pending(RequestStatus::Pending, "leave request").is_ok());
}

#[test]
fn resubmission_is_for_rejected_requests_only() {
    assert!(ensure_rejected(RequestStatus::Rejected, "adjustment request").is_ok());
    for status in [RequestStatus::Pending, RequestStatus::Approved] {
        let err = ensure_rejected(status, "adjustment request").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
}

#[test]
fn only_the_requester_edits_or_deletes() {
    let requester = Uuid::new_v4();
    assert!(ensure_requester(requester, requester, "overtime request").is_ok());
    let err = ensure_requester(requester, Uuid::new_v4(), "overtime request").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[test]
fn manager_originated_requests_need_the_owner() {
    let peer_manager = Uuid::new_v4();
    // A peer manager, even the employee's own manager, is refused.
    let err = authorize_decision(
        EmployeeRole::Manager,
        Some(peer_manager),
        peer_manager,
        EmployeeRole::Manager,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    // The owner may decide it.
    assert!(
        authorize_decision(
            EmployeeRole::Manager,
            Some(peer_manager),
            Uuid::new_v4(),
            EmployeeRole::Owner,
        )
        .is_ok()
    );
}

#[test]
fn managers_are_scoped_to_their_direct_reports() {
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

    let someone_elses_report = Some(Uuid::new_v4());
    let err = authorize_decision(
        EmployeeRole::Employee,
        someone_elses_report,
        manager,
        EmployeeRole::Manager,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    // An employee without a manager on file needs the owner.
    let err = authorize_decision(EmployeeRole::Employee, None, manager, EmployeeRole::Manager)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[test]
fn employees_hold_no_decision_power() {
    let err = authorize_decision(
        EmployeeRole::Employee,
        None,
        Uuid::new_v4(),
        EmployeeRole::Employee,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}
