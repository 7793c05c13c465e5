//! Role entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::permission::Permission;

/// A named grouping of permissions assignable to identities.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    /// Unique role identifier.
    pub id: Uuid,
    /// Unique role name.
    pub name: String,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
    /// Granted permissions, loaded by the repository.
    #[sqlx(skip)]
    #[serde(default)]
    pub permissions: Vec<Permission>,
}
