pub mod attendance;
pub mod audit;
pub mod employee;
pub mod leave;
pub(crate) mod macros;
pub mod overtime;
pub mod payroll;
pub mod policy;
pub mod schedule;
pub mod workflow;

pub use attendance::{
    AdjustmentInput, AdjustmentRequest, AttendanceRecord, AttendanceStatus, ClockInput,
};
pub use audit::{AuditEvent, CreateAuditInput};
pub use employee::{Company, Employee, EmployeeRole, EmploymentType};
pub use leave::{
    CreateLeaveRequestInput, CreateLeaveTypeInput, LeaveBalance, LeaveRequest, LeaveType,
    ManualQuotaInput, UpdateLeaveRequestInput, UpdateLeaveTypeInput,
};
pub use overtime::{
    CreateOvertimeRequestInput, OvertimeCompensation, OvertimeRequest, UpdateOvertimeRequestInput,
};
pub use payroll::{
    PayBreakdown, PayrollItem, PayrollItemOverride, PayrollRun, PayrollRunStatus,
};
pub use policy::{CompanyPolicy, PolicyType};
pub use schedule::{CreateShiftScheduleInput, ShiftSchedule, ShiftSlot};
pub use workflow::{DecisionInput, RequestStatus};
