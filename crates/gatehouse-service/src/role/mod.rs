//! Role catalogue queries.

pub mod service;

pub use service::RoleService;
