//! # gatehouse-auth
//!
//! Credential issuance and verification, password handling, and
//! permission resolution/evaluation for the Gatehouse platform.
//!
//! ## Modules
//!
//! - `credential` — signed access credentials and opaque refresh tokens
//! - `password` — Argon2id password hashing and policy enforcement
//! - `permission` — permission aggregation from roles and claim-based
//!   authorization decisions

pub mod credential;
pub mod password;
pub mod permission;

pub use credential::{AccessClaims, CredentialIssuer, CredentialVerifier};
pub use password::{PasswordHasher, PasswordValidator};
pub use permission::{AuthorizationEvaluator, PermissionResolver};
