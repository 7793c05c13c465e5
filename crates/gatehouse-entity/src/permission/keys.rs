//! Well-known permission keys.
//!
//! These are seeded into the catalogue at install time; authorization
//! checks compare against them by exact string match.

/// Create identities.
pub const USER_CREATE: &str = "User.Create";
/// Read identities.
pub const USER_READ: &str = "User.Read";
/// Update identities.
pub const USER_UPDATE: &str = "User.Update";
/// Delete identities.
pub const USER_DELETE: &str = "User.Delete";
