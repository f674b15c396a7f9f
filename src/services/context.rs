use uuid::Uuid;

use crate::database::models::EmployeeRole;

/// Already-authenticated identity handed in by the excluded request
/// layer. The engine trusts it and applies business rules only.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    pub role: EmployeeRole,
    pub manager_id: Option<Uuid>,
}

impl Actor {
    pub fn is_owner(&self) -> bool {
        self.role == EmployeeRole::Owner
    }

    pub fn is_manager(&self) -> bool {
        self.role == EmployeeRole::Manager
    }
}

/// Tenant and actor threaded explicitly into every engine call; no
/// operation falls back to an implicit default company.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub company_id: Uuid,
    pub actor: Actor,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn new(company_id: Uuid, actor: Actor) -> Self {
        Self {
            company_id,
            actor,
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn with_client_info(
        mut self,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }
}
