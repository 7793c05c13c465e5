//! Identity lifecycle state enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an identity row.
///
/// The only allowed transitions are `Active -> Deleted` (soft delete) and
/// `Deleted -> Active` (restore-on-create). Code must derive this state via
/// [`crate::Identity::state`] and apply transitions through the model's
/// transition methods rather than reading the deletion flag directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityState {
    /// The identity participates in the active scope: it is addressable,
    /// can authenticate, and its email/username count toward uniqueness.
    Active,
    /// The identity is soft-deleted: hidden from the active scope but
    /// retained for audit and restore.
    Deleted,
}

impl IdentityState {
    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for IdentityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
