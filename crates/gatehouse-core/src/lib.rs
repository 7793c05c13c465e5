//! # gatehouse-core
//!
//! Core crate for Gatehouse. Contains configuration schemas, domain events,
//! collaborator traits, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Gatehouse crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
