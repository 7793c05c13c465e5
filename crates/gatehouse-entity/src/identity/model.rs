//! Identity entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::role::Role;

use super::state::IdentityState;

/// An authenticable principal in the Gatehouse system.
///
/// The refresh-token pair of fields holds at most one live refresh session;
/// issuing a new session invalidates the previous token by overwrite.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Identity {
    /// Unique identity identifier.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Email address (unique among active identities, case-insensitive).
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the account may authenticate.
    pub is_active: bool,
    /// Soft-delete flag. Read through [`Identity::state`], not directly.
    pub is_deleted: bool,
    /// When the identity was soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Who soft-deleted the identity.
    pub deleted_by: Option<Uuid>,
    /// Current opaque refresh token (absent means no live session).
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    /// When the current refresh session expires.
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
    /// When the identity was created.
    pub created_at: DateTime<Utc>,
    /// When the identity was last updated.
    pub updated_at: DateTime<Utc>,
    /// Assigned roles, loaded by the repository with their permissions.
    #[sqlx(skip)]
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl Identity {
    /// Derives the lifecycle state from the soft-delete flag.
    pub fn state(&self) -> IdentityState {
        if self.is_deleted {
            IdentityState::Deleted
        } else {
            IdentityState::Active
        }
    }

    /// Transition `Active -> Deleted`.
    ///
    /// Role assignments and the refresh-token fields are retained for audit
    /// and restore.
    pub fn mark_deleted(&mut self, deleted_by: Option<Uuid>, now: DateTime<Utc>) {
        self.is_deleted = true;
        self.deleted_at = Some(now);
        self.deleted_by = deleted_by;
        self.updated_at = now;
    }

    /// Transition `Deleted -> Active`, re-occupying the row under its
    /// original ID.
    ///
    /// The caller overwrites username, password hash, and role set; this
    /// method clears the deletion markers and any refresh session left by
    /// the previous occupant.
    pub fn mark_restored(&mut self, now: DateTime<Utc>) {
        self.is_deleted = false;
        self.deleted_at = None;
        self.deleted_by = None;
        self.is_active = true;
        self.refresh_token = None;
        self.refresh_token_expires_at = None;
        self.updated_at = now;
    }

    /// Whether the stored refresh session matches the presented token and
    /// is still live at `now`. Expiry is exclusive: a session whose expiry
    /// equals `now` is no longer valid.
    pub fn refresh_session_live(&self, presented: &str, now: DateTime<Utc>) -> bool {
        match (&self.refresh_token, self.refresh_token_expires_at) {
            (Some(token), Some(expires_at)) => token == presented && expires_at > now,
            _ => false,
        }
    }
}
