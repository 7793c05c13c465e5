//! Permission and role-permission association models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single allowed action, named by a flat dotted key such as
/// `User.Create`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Permission {
    /// Unique permission identifier.
    pub id: Uuid,
    /// Unique permission key (`Category.Action`).
    pub key: String,
    /// Human-readable description.
    pub description: String,
    /// When the permission was created.
    pub created_at: DateTime<Utc>,
}

/// Association row between a role and a permission.
///
/// The composite primary key (`role_id`, `permission_id`) prevents a role
/// from holding the same permission twice; the explicit entity leaves room
/// for per-association metadata later.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RolePermission {
    /// The granting role.
    pub role_id: Uuid,
    /// The granted permission.
    pub permission_id: Uuid,
}
