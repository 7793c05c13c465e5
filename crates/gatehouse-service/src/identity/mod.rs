//! Identity lifecycle operations.

pub mod lifecycle;

pub use lifecycle::{CreateIdentityRequest, IdentityLifecycleManager, UpdateIdentityRequest};
