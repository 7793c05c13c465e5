//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for access-credential signing (HMAC-SHA256). Injected once
    /// at process startup and held immutable for the process lifetime.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Issuer claim stamped into and required from every access credential.
    #[serde(default = "default_jwt_issuer")]
    pub jwt_issuer: String,
    /// Audience claim stamped into and required from every access credential.
    #[serde(default = "default_jwt_audience")]
    pub jwt_audience: String,
    /// Access token TTL in minutes.
    ///
    /// Also the upper bound on permission-change propagation: authorization
    /// reads the permission set embedded at issuance, so a role change is
    /// only observed once the holder obtains a fresh credential.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_minutes: u64,
    /// Refresh session TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_days: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_jwt_issuer() -> String {
    "gatehouse".to_string()
}

fn default_jwt_audience() -> String {
    "gatehouse".to_string()
}

fn default_access_ttl() -> u64 {
    30
}

fn default_refresh_ttl() -> u64 {
    7
}

fn default_password_min() -> usize {
    8
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_issuer: default_jwt_issuer(),
            jwt_audience: default_jwt_audience(),
            access_token_ttl_minutes: default_access_ttl(),
            refresh_token_ttl_days: default_refresh_ttl(),
            password_min_length: default_password_min(),
        }
    }
}
