//! Permission catalogue entities.

pub mod keys;
pub mod model;

pub use model::{Permission, RolePermission};
