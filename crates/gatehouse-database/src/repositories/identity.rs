//! Identity repository implementation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_entity::identity::Identity;
use gatehouse_entity::permission::Permission;
use gatehouse_entity::role::Role;

/// Name of the partial unique index guarding active-scope email uniqueness.
const EMAIL_ACTIVE_INDEX: &str = "identities_email_active_key";

/// Name of the partial unique index guarding active-scope username uniqueness.
const USERNAME_ACTIVE_INDEX: &str = "identities_username_active_key";

/// Repository for identity persistence and query operations.
///
/// Read-then-write operations that touch both the identity row and its
/// role assignments (create, restore, update) run inside a single
/// transaction so a concurrent caller never observes a half-applied role
/// set.
#[derive(Debug, Clone)]
pub struct IdentityRepository {
    pool: PgPool,
}

/// Join row mapping an identity to one of its roles.
#[derive(Debug, FromRow)]
struct IdentityRoleRow {
    identity_id: Uuid,
    #[sqlx(flatten)]
    role: Role,
}

/// Join row mapping a role to one of its permissions.
#[derive(Debug, FromRow)]
struct RolePermissionRow {
    role_id: Uuid,
    #[sqlx(flatten)]
    permission: Permission,
}

impl IdentityRepository {
    /// Create a new identity repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an active identity by primary key, with roles and their
    /// permissions loaded.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Identity>> {
        let identity =
            sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE id = $1 AND NOT is_deleted")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to find identity by id", e)
                })?;

        self.with_roles(identity).await
    }

    /// Find an active identity by email (case-insensitive), with roles and
    /// their permissions loaded.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Identity>> {
        let identity = sqlx::query_as::<_, Identity>(
            "SELECT * FROM identities WHERE LOWER(email) = LOWER($1) AND NOT is_deleted",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find identity by email", e)
        })?;

        self.with_roles(identity).await
    }

    /// Find an identity by email (case-insensitive) regardless of deletion
    /// state. Used for restore detection; roles are not loaded.
    pub async fn find_by_email_any_state(&self, email: &str) -> AppResult<Option<Identity>> {
        sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    "Failed to find identity by email (any state)",
                    e,
                )
            })
    }

    /// Find the active identity holding the given refresh token, with roles
    /// and their permissions loaded.
    ///
    /// The token column is compared for exact equality: the token is a
    /// lookup key, not a parsed credential.
    pub async fn find_by_refresh_token(&self, token: &str) -> AppResult<Option<Identity>> {
        let identity = sqlx::query_as::<_, Identity>(
            "SELECT * FROM identities WHERE refresh_token = $1 AND NOT is_deleted",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to find identity by refresh token",
                e,
            )
        })?;

        self.with_roles(identity).await
    }

    /// List all active identities with roles loaded, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<Identity>> {
        let mut identities = sqlx::query_as::<_, Identity>(
            "SELECT * FROM identities WHERE NOT is_deleted ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list identities", e))?;

        let ids: Vec<Uuid> = identities.iter().map(|i| i.id).collect();
        let mut by_identity = self.roles_for_identities(&ids).await?;
        for identity in &mut identities {
            identity.roles = by_identity.remove(&identity.id).unwrap_or_default();
        }

        Ok(identities)
    }

    /// Insert a new identity and its role assignments in one transaction.
    pub async fn insert(&self, identity: &Identity, role_ids: &[Uuid]) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query(
            "INSERT INTO identities \
             (id, username, email, password_hash, is_active, is_deleted, deleted_at, deleted_by, \
              refresh_token, refresh_token_expires_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(identity.id)
        .bind(&identity.username)
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(identity.is_active)
        .bind(identity.is_deleted)
        .bind(identity.deleted_at)
        .bind(identity.deleted_by)
        .bind(&identity.refresh_token)
        .bind(identity.refresh_token_expires_at)
        .bind(identity.created_at)
        .bind(identity.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| translate_unique_conflict(e, "Failed to insert identity"))?;

        replace_role_assignments(&mut tx, identity.id, role_ids).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit identity insert", e)
        })
    }

    /// Re-occupy a soft-deleted row under its original ID: overwrite the
    /// mutable fields, clear the deletion markers and any stale refresh
    /// session, and replace the role set. Runs in one transaction.
    pub async fn restore(&self, identity: &Identity, role_ids: &[Uuid]) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query(
            "UPDATE identities SET username = $2, email = $3, password_hash = $4, \
                                   is_active = TRUE, is_deleted = FALSE, \
                                   deleted_at = NULL, deleted_by = NULL, \
                                   refresh_token = NULL, refresh_token_expires_at = NULL, \
                                   updated_at = $5 \
             WHERE id = $1",
        )
        .bind(identity.id)
        .bind(&identity.username)
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(identity.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| translate_unique_conflict(e, "Failed to restore identity"))?;

        replace_role_assignments(&mut tx, identity.id, role_ids).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit identity restore", e)
        })
    }

    /// Overwrite an active identity's fields and fully replace its role set
    /// in one transaction. Returns `false` when no active row matched.
    pub async fn update(&self, identity: &Identity, role_ids: &[Uuid]) -> AppResult<bool> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let result = sqlx::query(
            "UPDATE identities SET username = $2, email = $3, is_active = $4, updated_at = $5 \
             WHERE id = $1 AND NOT is_deleted",
        )
        .bind(identity.id)
        .bind(&identity.username)
        .bind(&identity.email)
        .bind(identity.is_active)
        .bind(identity.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| translate_unique_conflict(e, "Failed to update identity"))?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        replace_role_assignments(&mut tx, identity.id, role_ids).await?;

        tx.commit()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to commit identity update", e)
            })
            .map(|()| true)
    }

    /// Overwrite the stored refresh session in a single statement.
    ///
    /// This is the rotation write: the previous token is invalidated by the
    /// overwrite, and the last writer wins under concurrency.
    pub async fn set_refresh_session(
        &self,
        identity_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE identities SET refresh_token = $2, refresh_token_expires_at = $3, \
                                   updated_at = NOW() \
             WHERE id = $1 AND NOT is_deleted",
        )
        .bind(identity_id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to store refresh session", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Identity {identity_id} not found"
            )));
        }
        Ok(())
    }

    /// Soft-delete an active identity. Returns `false` when no active row
    /// matched (already deleted rows are not re-deleted).
    ///
    /// Role assignments and refresh-token fields are retained for audit and
    /// restore.
    pub async fn soft_delete(
        &self,
        identity_id: Uuid,
        deleted_by: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE identities SET is_deleted = TRUE, deleted_at = $2, deleted_by = $3, \
                                   updated_at = $2 \
             WHERE id = $1 AND NOT is_deleted",
        )
        .bind(identity_id)
        .bind(now)
        .bind(deleted_by)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to soft-delete identity", e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    /// Attach loaded roles to a single optional identity.
    async fn with_roles(&self, identity: Option<Identity>) -> AppResult<Option<Identity>> {
        let Some(mut identity) = identity else {
            return Ok(None);
        };
        let mut by_identity = self.roles_for_identities(&[identity.id]).await?;
        identity.roles = by_identity.remove(&identity.id).unwrap_or_default();
        Ok(Some(identity))
    }

    /// Load roles (with permissions) for a batch of identities.
    async fn roles_for_identities(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<Role>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let role_rows = sqlx::query_as::<_, IdentityRoleRow>(
            "SELECT ir.identity_id, r.id, r.name, r.created_at \
             FROM identity_roles ir \
             JOIN roles r ON r.id = ir.role_id \
             WHERE ir.identity_id = ANY($1) \
             ORDER BY r.name",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load roles", e))?;

        let role_ids: Vec<Uuid> = role_rows.iter().map(|r| r.role.id).collect();

        let mut permissions_by_role: HashMap<Uuid, Vec<Permission>> = HashMap::new();
        if !role_ids.is_empty() {
            let permission_rows = sqlx::query_as::<_, RolePermissionRow>(
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

            for row in permission_rows {
                permissions_by_role
                    .entry(row.role_id)
                    .or_default()
                    .push(row.permission);
            }
        }

        let mut by_identity: HashMap<Uuid, Vec<Role>> = HashMap::new();
        for row in role_rows {
            let mut role = row.role;
            role.permissions = permissions_by_role
                .get(&role.id)
                .cloned()
                .unwrap_or_default();
            by_identity.entry(row.identity_id).or_default().push(role);
        }

        Ok(by_identity)
    }
}

/// Replace all role assignments for an identity inside an open transaction.
async fn replace_role_assignments(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    identity_id: Uuid,
    role_ids: &[Uuid],
) -> AppResult<()> {
    sqlx::query("DELETE FROM identity_roles WHERE identity_id = $1")
        .bind(identity_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to clear role assignments", e)
        })?;

    for role_id in role_ids {
        sqlx::query(
            "INSERT INTO identity_roles (identity_id, role_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(identity_id)
        .bind(role_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to assign role", e)
        })?;
    }

    Ok(())
}

/// Translate violations of the active-scope uniqueness indexes into domain
/// failures; everything else stays a database error.
fn translate_unique_conflict(e: sqlx::Error, context: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(EMAIL_ACTIVE_INDEX) => {
            AppError::duplicate_email("Email already exists")
        }
        sqlx::Error::Database(ref db_err)
            if db_err.constraint() == Some(USERNAME_ACTIVE_INDEX) =>
        {
            AppError::validation("Username already exists")
        }
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}
