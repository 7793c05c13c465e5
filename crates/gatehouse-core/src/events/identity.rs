//! Identity-related domain events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to identity lifecycle operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IdentityEvent {
    /// A new identity was created.
    Created {
        /// The identity ID.
        identity_id: Uuid,
        /// The username.
        username: String,
    },
    /// A soft-deleted identity was restored under its original ID.
    Restored {
        /// The identity ID.
        identity_id: Uuid,
        /// The username after restore.
        username: String,
    },
    /// An identity was soft-deleted.
    Deleted {
        /// The identity ID.
        identity_id: Uuid,
        /// The username at deletion time.
        username: String,
    },
}

impl IdentityEvent {
    /// Renders the event into the human-readable broadcast message.
    pub fn message(&self) -> String {
        match self {
            Self::Created { username, .. } | Self::Restored { username, .. } => {
                format!("New user '{username}' has been created.")
            }
            Self::Deleted { username, .. } => {
                format!("User '{username}' has been deleted.")
            }
        }
    }
}
