//! # gatehouse-entity
//!
//! Domain entity models for Gatehouse: identities, roles, and the
//! permission catalogue. Models map 1:1 to database rows via sqlx
//! `FromRow`; association collections are loaded separately by the
//! repositories and carried in `#[sqlx(skip)]` fields.

pub mod identity;
pub mod permission;
pub mod role;

pub use identity::{Identity, IdentityState};
pub use permission::{Permission, RolePermission};
pub use role::Role;
