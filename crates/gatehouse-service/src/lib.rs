//! # gatehouse-service
//!
//! Business logic service layer for Gatehouse. Each service orchestrates
//! repositories, credential handling, and notification dispatch to
//! implement application-level use cases.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod auth;
pub mod identity;
pub mod notify;
pub mod role;

pub use auth::{AuthService, AuthTokens, RefreshSessionStore};
pub use identity::IdentityLifecycleManager;
pub use notify::ChannelNotificationDispatcher;
pub use role::RoleService;
