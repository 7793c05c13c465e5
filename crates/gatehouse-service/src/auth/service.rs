//! Login and refresh flows.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use gatehouse_auth::credential::CredentialIssuer;
use gatehouse_auth::password::PasswordHasher;
use gatehouse_auth::permission::PermissionResolver;
use gatehouse_core::error::AppError;
use gatehouse_database::repositories::identity::IdentityRepository;
use gatehouse_entity::identity::Identity;

use super::session::RefreshSessionStore;

/// Result of a successful login or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    /// Signed access credential.
    pub access_token: String,
    /// Opaque refresh token.
    pub refresh_token: String,
    /// The authenticated identity's email.
    pub email: String,
    /// The authenticated identity's username.
    pub username: String,
}

/// Orchestrates credential issuance for login and refresh.
#[derive(Debug, Clone)]
pub struct AuthService {
    /// Identity persistence.
    identity_repo: Arc<IdentityRepository>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Permission aggregation.
    resolver: PermissionResolver,
    /// Credential issuance.
    issuer: Arc<CredentialIssuer>,
    /// Refresh session ownership.
    sessions: Arc<RefreshSessionStore>,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        identity_repo: Arc<IdentityRepository>,
        hasher: Arc<PasswordHasher>,
        issuer: Arc<CredentialIssuer>,
        sessions: Arc<RefreshSessionStore>,
    ) -> Self {
        Self {
            identity_repo,
            hasher,
            resolver: PermissionResolver::new(),
            issuer,
            sessions,
        }
    }

    /// Authenticates by email and password and mints a token pair.
    ///
    /// Unknown email and wrong password both fail with the same
    /// `InvalidCredentials` message so that login responses cannot be used
    /// to enumerate registered emails.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, AppError> {
        let identity = self
            .identity_repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::invalid_credentials("Invalid credentials"))?;

        let password_valid = self.hasher.verify(password, &identity.password_hash)?;
        if !password_valid {
            return Err(AppError::invalid_credentials("Invalid credentials"));
        }

        if !identity.is_active {
            return Err(AppError::inactive_identity("User is not active"));
        }

        let tokens = self.mint_tokens(&identity).await?;

        info!(identity_id = %identity.id, "Login successful");

        Ok(tokens)
    }

    /// Exchanges a live refresh token for a fresh token pair.
    ///
    /// Permissions are recomputed from the identity's current roles, so a
    /// role change takes effect on the next refresh. The presented token is
    /// superseded by the rotation write.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens, AppError> {
        let identity = self.sessions.redeem(refresh_token).await?;

        let tokens = self.mint_tokens(&identity).await?;

        info!(identity_id = %identity.id, "Refresh token rotated");

        Ok(tokens)
    }

    /// Resolves permissions, signs an access credential, and rotates the
    /// refresh session.
    async fn mint_tokens(&self, identity: &Identity) -> Result<AuthTokens, AppError> {
        let permissions = self.resolver.resolve(identity);
        let (access_token, _) = self.issuer.issue_access_token(identity, &permissions)?;
        let (refresh_token, _) = self.sessions.issue_session(identity).await?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            email: identity.email.clone(),
            username: identity.username.clone(),
        })
    }
}
