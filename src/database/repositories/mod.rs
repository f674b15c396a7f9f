pub mod adjustment;
pub mod attendance;
pub mod audit;
pub mod employee;
pub mod leave_balance;
pub mod leave_request;
pub mod leave_type;
pub mod overtime;
pub mod payroll;
pub mod policy;
pub mod schedule;

pub use adjustment::AdjustmentRepository;
pub use attendance::AttendanceRepository;
pub use audit::AuditRepository;
pub use employee::DirectoryRepository;
pub use leave_balance::LeaveBalanceRepository;
pub use leave_request::LeaveRequestRepository;
pub use leave_type::LeaveTypeRepository;
pub use overtime::OvertimeRepository;
pub use payroll::{NewPayrollItem, PayrollRepository};
pub use policy::PolicyRepository;
pub use schedule::ScheduleRepository;
