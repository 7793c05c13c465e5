//! Identity lifecycle: create (with restore-on-create), update, and soft
//! delete, plus the read queries callers build listings from.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use gatehouse_auth::password::{PasswordHasher, PasswordValidator};
use gatehouse_core::error::AppError;
use gatehouse_core::events::IdentityEvent;
use gatehouse_core::traits::NotificationDispatcher;
use gatehouse_database::repositories::identity::IdentityRepository;
use gatehouse_database::repositories::role::RoleRepository;
use gatehouse_entity::identity::{Identity, IdentityState};

/// Request to create a new identity.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateIdentityRequest {
    /// Username.
    pub username: String,
    /// Email (unique among active identities).
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Roles to assign. Unknown IDs are silently dropped.
    pub role_ids: Vec<Uuid>,
}

/// Request to update an existing identity.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UpdateIdentityRequest {
    /// New username.
    pub username: String,
    /// New email.
    pub email: String,
    /// New active flag.
    pub is_active: bool,
    /// Full replacement role set. Unknown IDs are silently dropped.
    pub role_ids: Vec<Uuid>,
}

/// Drives the identity state machine: `Active <-> Deleted`.
///
/// Create either inserts a fresh row or, when a soft-deleted row already
/// holds the requested email, restores that row under its original ID.
/// Uniqueness checks apply to the active scope only.
#[derive(Clone)]
pub struct IdentityLifecycleManager {
    /// Identity persistence.
    identity_repo: Arc<IdentityRepository>,
    /// Role catalogue.
    role_repo: Arc<RoleRepository>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Password policy.
    validator: Arc<PasswordValidator>,
    /// Best-effort broadcast channel for lifecycle announcements.
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl std::fmt::Debug for IdentityLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityLifecycleManager").finish()
    }
}

impl IdentityLifecycleManager {
    /// Creates a new lifecycle manager.
    pub fn new(
        identity_repo: Arc<IdentityRepository>,
        role_repo: Arc<RoleRepository>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            identity_repo,
            role_repo,
            hasher,
            validator,
            dispatcher,
        }
    }

    /// Lists all active identities with their roles.
    pub async fn list(&self) -> Result<Vec<Identity>, AppError> {
        self.identity_repo.find_all().await
    }

    /// Gets a single active identity by ID.
    pub async fn get(&self, id: Uuid) -> Result<Identity, AppError> {
        self.identity_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Creates a new identity, or restores a soft-deleted one holding the
    /// same email.
    ///
    /// - An *active* identity with the email (case-insensitive) fails with
    ///   `DuplicateEmail`.
    /// - A *soft-deleted* identity with the email is restored: same ID,
    ///   username/password/roles overwritten, deletion markers cleared.
    /// - Otherwise a fresh row is inserted.
    pub async fn create(&self, req: CreateIdentityRequest) -> Result<Identity, AppError> {
        validate_username(&req.username)?;
        validate_email(&req.email)?;
        self.validator.validate(&req.password)?;

        // Unknown role IDs are silently dropped; validation is the caller's
        // concern.
        let roles = self.role_repo.find_by_ids(&req.role_ids).await?;
        let role_ids: Vec<Uuid> = roles.iter().map(|role| role.id).collect();

        let password_hash = self.hasher.hash(&req.password)?;
        let now = Utc::now();

        let existing = self.identity_repo.find_by_email_any_state(&req.email).await?;

        let identity = match existing {
            Some(found) if found.state() == IdentityState::Active => {
                return Err(AppError::duplicate_email("Email already exists"));
            }
            Some(mut found) => {
                // Deleted -> Active: re-occupy the row under its original ID.
                found.username = req.username;
                found.email = req.email;
                found.password_hash = password_hash;
                found.mark_restored(now);

                self.identity_repo.restore(&found, &role_ids).await?;
                found.roles = roles;

                info!(identity_id = %found.id, username = %found.username, "Identity restored");

                self.announce(IdentityEvent::Restored {
                    identity_id: found.id,
                    username: found.username.clone(),
                });

                found
            }
            None => {
                let mut identity = Identity {
                    id: Uuid::new_v4(),
                    username: req.username,
                    email: req.email,
                    password_hash,
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

                self.identity_repo.insert(&identity, &role_ids).await?;
                identity.roles = roles;

                info!(identity_id = %identity.id, username = %identity.username, "Identity created");

                self.announce(IdentityEvent::Created {
                    identity_id: identity.id,
                    username: identity.username.clone(),
                });

                identity
            }
        };

        Ok(identity)
    }

    /// Overwrites an active identity's fields and fully replaces its role
    /// set (clear-then-reassign, not diff-merge).
    ///
    /// Fails with `NotFound` when no active identity holds the ID, and with
    /// `DuplicateEmail` when a *different* active identity already holds the
    /// target email (case-insensitive); updating to the identity's own
    /// email, in any casing, succeeds.
    pub async fn update(
        &self,
        id: Uuid,
        req: UpdateIdentityRequest,
    ) -> Result<Identity, AppError> {
        validate_username(&req.username)?;
        validate_email(&req.email)?;

        let mut identity = self.get(id).await?;

        if let Some(holder) = self.identity_repo.find_by_email(&req.email).await? {
            if holder.id != id {
                return Err(AppError::duplicate_email("Email already exists"));
            }
        }

        identity.username = req.username;
        identity.email = req.email;
        identity.is_active = req.is_active;
        identity.updated_at = Utc::now();

        let roles = self.role_repo.find_by_ids(&req.role_ids).await?;
        let role_ids: Vec<Uuid> = roles.iter().map(|role| role.id).collect();

        let updated = self.identity_repo.update(&identity, &role_ids).await?;
        if !updated {
            return Err(AppError::not_found("User not found"));
        }

        identity.roles = roles;

        info!(identity_id = %identity.id, username = %identity.username, "Identity updated");

        Ok(identity)
    }

    /// Transitions an active identity to `Deleted`.
    ///
    /// The row is retained (with its role assignments and refresh-token
    /// fields) for audit and restore. Deleting an already-deleted or
    /// unknown identity fails with `NotFound` — delete is not idempotent.
    pub async fn delete(&self, id: Uuid, deleted_by: Option<Uuid>) -> Result<(), AppError> {
        let identity = self.get(id).await?;

        let deleted = self
            .identity_repo
            .soft_delete(id, deleted_by, Utc::now())
            .await?;
        if !deleted {
            return Err(AppError::not_found("User not found"));
        }

        info!(identity_id = %id, username = %identity.username, "Identity deleted");

        self.announce(IdentityEvent::Deleted {
            identity_id: id,
            username: identity.username,
        });

        Ok(())
    }

    /// Fire-and-forget broadcast. The lifecycle operation has already
    /// committed; delivery failures are the dispatcher's to swallow.
    fn announce(&self, event: IdentityEvent) {
        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move {
            dispatcher.broadcast(&event.message()).await;
        });
    }
}

/// Username length bounds shared by create and update.
fn validate_username(username: &str) -> Result<(), AppError> {
    let trimmed = username.trim();
    if trimmed.len() < 3 {
        return Err(AppError::validation(
            "Username must be at least 3 characters",
        ));
    }
    if trimmed.len() > 50 {
        return Err(AppError::validation(
            "Username must be at most 50 characters",
        ));
    }
    Ok(())
}

/// Minimal email shape check; full address validation is the boundary's
/// concern.
fn validate_email(email: &str) -> Result<(), AppError> {
    if !email.contains('@') || !email.contains('.') {
        return Err(AppError::validation("Invalid email format"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_bounds() {
        assert!(validate_username("al").is_err());
        assert!(validate_username("alice").is_ok());
        assert!(validate_username(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_email_shape() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing-dot@host").is_err());
    }
}
