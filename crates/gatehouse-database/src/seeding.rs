//! Idempotent database seeding.
//!
//! Installs the permission catalogue, the SuperAdmin role holding every
//! permission, and the initial administrator identity. Safe to run on
//! every startup: existing rows are left untouched.

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use gatehouse_core::result::AppResult;
use gatehouse_entity::identity::Identity;
use gatehouse_entity::permission::keys;

use crate::repositories::identity::IdentityRepository;
use crate::repositories::permission::PermissionRepository;
use crate::repositories::role::RoleRepository;

/// Name of the role granted every permission in the catalogue.
pub const SUPER_ADMIN_ROLE: &str = "SuperAdmin";

/// Username of the seeded administrator identity.
pub const ADMIN_USERNAME: &str = "admin";

/// Email of the seeded administrator identity.
pub const ADMIN_EMAIL: &str = "admin@domain.com";

/// Seed the permission catalogue, SuperAdmin role, and admin identity.
///
/// The caller provides the already-hashed admin password; this crate does
/// not depend on the hashing service.
pub async fn seed(pool: &PgPool, admin_password_hash: &str) -> AppResult<()> {
    let permission_repo = PermissionRepository::new(pool.clone());
    let role_repo = RoleRepository::new(pool.clone());
    let identity_repo = IdentityRepository::new(pool.clone());

    let catalogue = [
        (keys::USER_CREATE, "Create users"),
        (keys::USER_READ, "Read users"),
        (keys::USER_UPDATE, "Update users"),
        (keys::USER_DELETE, "Delete users"),
    ];

    for (key, description) in catalogue {
        if permission_repo.find_by_key(key).await?.is_none() {
            permission_repo.create(key, description).await?;
        }
    }

    let super_admin = match role_repo.find_by_name(SUPER_ADMIN_ROLE).await? {
        Some(role) => role,
        None => role_repo.create(SUPER_ADMIN_ROLE).await?,
    };

    for permission in permission_repo.find_all().await? {
        permission_repo
            .grant_to_role(super_admin.id, permission.id)
            .await?;
    }

    if identity_repo
        .find_by_email_any_state(ADMIN_EMAIL)
        .await?
        .is_none()
    {
        let now = Utc::now();
        let admin = Identity {
            id: Uuid::new_v4(),
            username: ADMIN_USERNAME.to_string(),
            email: ADMIN_EMAIL.to_string(),
            password_hash: admin_password_hash.to_string(),
            is_active: true,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
            refresh_token: None,
            refresh_token_expires_at: None,
            created_at: now,
            updated_at: now,
            roles: Vec::new(),
        };

        identity_repo.insert(&admin, &[super_admin.id]).await?;

        info!(identity_id = %admin.id, email = ADMIN_EMAIL, "Seeded initial admin identity");
    }

    info!("Database seeding completed");
    Ok(())
}
