//! Role entity.

pub mod model;

pub use model::Role;
