use serde::{Deserialize, Serialize};

use super::macros::string_enum;

string_enum! {
    /// Shared lifecycle for adjustable requests. Pending is the only
    /// state a request can be decided, updated, or deleted from;
    /// rejected adjustment requests alone may re-enter pending.
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum RequestStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionInput {
    pub reason: Option<String>,
}
