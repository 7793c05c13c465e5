//! Role catalogue listing.

use std::sync::Arc;

use gatehouse_core::error::AppError;
use gatehouse_database::repositories::role::RoleRepository;
use gatehouse_entity::role::Role;

/// Read access to the role catalogue.
#[derive(Debug, Clone)]
pub struct RoleService {
    /// Role repository.
    role_repo: Arc<RoleRepository>,
}

impl RoleService {
    /// Creates a new role service.
    pub fn new(role_repo: Arc<RoleRepository>) -> Self {
        Self { role_repo }
    }

    /// Lists all roles with their granted permissions.
    pub async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        self.role_repo.find_all().await
    }
}
