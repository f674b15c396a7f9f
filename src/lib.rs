pub mod config;
pub mod database;
pub mod engine;
pub mod error;
pub mod services;

use sqlx::PgPool;

pub use config::Config;
pub use error::{AppError, ErrorKind};
pub use services::{Actor, RequestContext};

use database::repositories::{
    AdjustmentRepository, AttendanceRepository, AuditRepository, DirectoryRepository,
    LeaveBalanceRepository, LeaveRequestRepository, LeaveTypeRepository, OvertimeRepository,
    PayrollRepository, PolicyRepository, ScheduleRepository,
};
use services::{
    AttendanceService, AuditLogger, LeaveService, OvertimeService, PayrollService, PolicyStore,
};

/// Everything the request layer needs, wired once at startup.
pub struct AppState {
    pub attendance: AttendanceService,
    pub leave: LeaveService,
    pub overtime: OvertimeService,
    pub payroll: PayrollService,
    pub policies: PolicyStore,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let directory = DirectoryRepository::new(pool.clone());
        let audit = AuditLogger::new(AuditRepository::new(pool.clone()));
        let policies = PolicyStore::new(PolicyRepository::new(pool.clone()), audit.clone());

        let attendance = AttendanceService::new(
            directory.clone(),
            AttendanceRepository::new(pool.clone()),
            AdjustmentRepository::new(pool.clone()),
            ScheduleRepository::new(pool.clone()),
            policies.clone(),
            audit.clone(),
        );
        let leave = LeaveService::new(
            directory.clone(),
            LeaveTypeRepository::new(pool.clone()),
            LeaveBalanceRepository::new(pool.clone()),
            LeaveRequestRepository::new(pool.clone()),
            policies.clone(),
            audit.clone(),
        );
        let overtime = OvertimeService::new(
            directory.clone(),
            OvertimeRepository::new(pool.clone()),
            policies.clone(),
            audit.clone(),
        );
        let payroll = PayrollService::new(
            directory,
            AttendanceRepository::new(pool.clone()),
            OvertimeRepository::new(pool.clone()),
            PayrollRepository::new(pool),
            policies.clone(),
            audit,
        );

        Self {
            attendance,
            leave,
            overtime,
            payroll,
            policies,
        }
    }
}
