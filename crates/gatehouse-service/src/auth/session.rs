//! Refresh session ownership: the single live refresh token per identity.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use gatehouse_auth::credential::CredentialIssuer;
use gatehouse_core::config::auth::AuthConfig;
use gatehouse_core::error::AppError;
use gatehouse_database::repositories::identity::IdentityRepository;
use gatehouse_entity::identity::Identity;

/// Owns the refresh token and expiry stored on the identity row.
///
/// An identity holds at most one live refresh session; `issue_session`
/// rotates by overwriting the stored token in a single write, so the last
/// writer wins under concurrency and any superseded token fails its next
/// `redeem`. `redeem` itself never mutates state — authentication (the
/// read) is kept separate from rotation (the write) so both show up
/// distinctly in the audit trail.
#[derive(Debug, Clone)]
pub struct RefreshSessionStore {
    /// Identity persistence.
    identity_repo: Arc<IdentityRepository>,
    /// Refresh token generator.
    issuer: Arc<CredentialIssuer>,
    /// Refresh session TTL in days.
    refresh_ttl_days: i64,
}

impl RefreshSessionStore {
    /// Creates a new refresh session store.
    pub fn new(
        identity_repo: Arc<IdentityRepository>,
        issuer: Arc<CredentialIssuer>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            identity_repo,
            issuer,
            refresh_ttl_days: config.refresh_token_ttl_days as i64,
        }
    }

    /// Generates a fresh refresh token, stamps its expiry, and overwrites
    /// the identity's stored session.
    pub async fn issue_session(
        &self,
        identity: &Identity,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let token = self.issuer.issue_refresh_token();
        let expires_at = Utc::now() + Duration::days(self.refresh_ttl_days);

        self.identity_repo
            .set_refresh_session(identity.id, &token, expires_at)
            .await?;

        info!(identity_id = %identity.id, expires_at = %expires_at, "Refresh session issued");

        Ok((token, expires_at))
    }

    /// Authenticates a presented refresh token against the stored session.
    ///
    /// Fails with `SessionInvalid` when no identity holds that exact token
    /// or the stored expiry is at or before now (expiry is exclusive), and
    /// with `InactiveIdentity` when the session matched but the account is
    /// deactivated. On success the caller is responsible for rotating via
    /// [`Self::issue_session`].
    pub async fn redeem(&self, presented_token: &str) -> Result<Identity, AppError> {
        let identity = self
            .identity_repo
            .find_by_refresh_token(presented_token)
            .await?
            .ok_or_else(|| AppError::session_invalid("Invalid or expired refresh token"))?;

        if !identity.refresh_session_live(presented_token, Utc::now()) {
            return Err(AppError::session_invalid("Invalid or expired refresh token"));
        }

        if !identity.is_active {
            return Err(AppError::inactive_identity("User is not active"));
        }

        Ok(identity)
    }
}
