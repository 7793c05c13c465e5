//! Access credentials and refresh tokens.

pub mod claims;
pub mod issuer;
pub mod verifier;

pub use claims::AccessClaims;
pub use issuer::CredentialIssuer;
pub use verifier::CredentialVerifier;
