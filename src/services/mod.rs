pub mod attendance;
pub mod audit_logger;
pub mod context;
pub mod leave;
pub mod overtime;
pub mod payroll;
pub mod policy_store;

pub use attendance::AttendanceService;
pub use audit_logger::AuditLogger;
pub use context::{Actor, RequestContext};
pub use leave::LeaveService;
pub use overtime::OvertimeService;
pub use payroll::PayrollService;
pub use policy_store::PolicyStore;
