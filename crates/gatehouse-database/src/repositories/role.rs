//! Role repository implementation.

use std::collections::HashMap;

use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_entity::permission::Permission;
use gatehouse_entity::role::Role;

/// Repository for role catalogue queries.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct RolePermissionRow {
    role_id: Uuid,
    #[sqlx(flatten)]
    permission: Permission,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all roles with their permissions, ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list roles", e))?;

        self.attach_permissions(roles).await
    }

    /// Resolve a set of role IDs to the roles that exist.
    ///
    /// IDs that match no role are dropped without error: role-id validation
    /// is the caller's concern, not this repository's.
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Role>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let roles =
            sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = ANY($1) ORDER BY name")
                .bind(ids)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to find roles by ids", e)
                })?;

        self.attach_permissions(roles).await
    }

    /// Create a new role.
    pub async fn create(&self, name: &str) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            "INSERT INTO roles (id, name, created_at) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(chrono::Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("roles_name_key") => {
                AppError::validation(format!("Role '{name}' already exists"))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create role", e),
        })
    }

    /// Find a role by its unique name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find role by name", e)
            })?;

        match role {
            Some(role) => {
                let mut roles = self.attach_permissions(vec![role]).await?;
                Ok(roles.pop())
            }
            None => Ok(None),
        }
    }

    /// Load granted permissions for each role.
    async fn attach_permissions(&self, mut roles: Vec<Role>) -> AppResult<Vec<Role>> {
        if roles.is_empty() {
            return Ok(roles);
        }

        let role_ids: Vec<Uuid> = roles.iter().map(|r| r.id).collect();

        let rows = sqlx::query_as::<_, RolePermissionRow>(
            "SELECT rp.role_id, p.id, p.key, p.description, p.created_at \
             FROM role_permissions rp \
             JOIN permissions p ON p.id = rp.permission_id \
             WHERE rp.role_id = ANY($1) \
             ORDER BY p.key",
        )
        .bind(&role_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load role permissions", e)
        })?;

        let mut by_role: HashMap<Uuid, Vec<Permission>> = HashMap::new();
        for row in rows {
            by_role.entry(row.role_id).or_default().push(row.permission);
        }

        for role in &mut roles {
            role.permissions = by_role.remove(&role.id).unwrap_or_default();
        }

        Ok(roles)
    }
}
