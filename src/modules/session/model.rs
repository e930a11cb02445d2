use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct OrganizationsQuery {
    /// Comma separated admitted roles. Empty or absent admits any role.
    pub roles: Option<String>,
}

impl OrganizationsQuery {
    pub fn admitted_roles(&self) -> Vec<&str> {
        self.roles
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|role| !role.is_empty())
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrganizationsResponse {
    /// Minimal set of organizations covering every organization the session
    /// holds one of the roles in, sorted
    pub organizations: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
