//! Credential creation: signed access tokens and opaque refresh tokens.

use std::collections::BTreeSet;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use rand::Rng;

use gatehouse_core::config::auth::AuthConfig;
use gatehouse_core::error::AppError;
use gatehouse_entity::identity::Identity;

use super::claims::{AccessClaims, PERMISSIONS_DELIMITER};

/// Number of random bytes in an opaque refresh token (512 bits).
const REFRESH_TOKEN_BYTES: usize = 64;

/// Mints access credentials and refresh tokens.
///
/// The signing key comes from process-wide configuration, injected once at
/// startup. Persisting the refresh token is the session store's concern;
/// this type only produces values.
#[derive(Clone)]
pub struct CredentialIssuer {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Issuer claim value.
    issuer: String,
    /// Audience claim value.
    audience: String,
    /// Access credential TTL in minutes.
    access_ttl_minutes: i64,
}

impl std::fmt::Debug for CredentialIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .finish()
    }
}

impl CredentialIssuer {
    /// Creates a new issuer from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            access_ttl_minutes: config.access_token_ttl_minutes as i64,
        }
    }

    /// Signs a time-boxed access credential binding the identity and its
    /// resolved permission set.
    ///
    /// The permission set arrives as a `BTreeSet`, so the serialized claim
    /// is sorted and identical across reissues for the same grants.
    pub fn issue_access_token(
        &self,
        identity: &Identity,
        permissions: &BTreeSet<String>,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::minutes(self.access_ttl_minutes);

        let joined = permissions
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(&PERMISSIONS_DELIMITER.to_string());

        let claims = AccessClaims {
            sub: identity.id,
            email: identity.email.clone(),
            permissions: joined,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        Ok((token, expires_at))
    }

    /// Generates an opaque refresh token: 512 bits from a cryptographically
    /// secure source, base64-encoded.
    ///
    /// The token carries no embedded semantics — it is a lookup key. Expiry
    /// is tracked separately by the refresh session store.
    pub fn issue_refresh_token(&self) -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        BASE64.encode(bytes)
    }
}
