//! Claims embedded in every access credential.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delimiter joining permission keys in the permissions claim.
pub const PERMISSIONS_DELIMITER: char = ',';

/// Claims payload of a signed access credential.
///
/// The permission set travels as a single delimited string claim so that
/// authorization never needs a per-request database lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject — the identity ID.
    pub sub: Uuid,
    /// Email at the time of issuance.
    pub email: String,
    /// Granted permission keys joined by [`PERMISSIONS_DELIMITER`].
    pub permissions: String,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl AccessClaims {
    /// Returns the identity ID from the subject claim.
    pub fn identity_id(&self) -> Uuid {
        self.sub
    }

    /// Parses the permissions claim, discarding empty tokens.
    pub fn permission_keys(&self) -> Vec<&str> {
        self.permissions
            .split(PERMISSIONS_DELIMITER)
            .filter(|key| !key.is_empty())
            .collect()
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Checks whether this credential has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(permissions: &str) -> AccessClaims {
        AccessClaims {
            sub: Uuid::new_v4(),
            email: "alice@example.com".into(),
            permissions: permissions.into(),
            iss: "gatehouse".into(),
            aud: "gatehouse".into(),
            iat: 0,
            exp: i64::MAX,
        }
    }

    #[test]
    fn test_permission_keys_parsing() {
        let claims = claims("User.Create,User.Read");
        let parsed = claims.permission_keys();
        assert_eq!(parsed, vec!["User.Create", "User.Read"]);
    }

    #[test]
    fn test_permission_keys_discards_empty_tokens() {
        assert_eq!(claims("").permission_keys(), Vec::<&str>::new());
        assert_eq!(
            claims(",User.Read,,").permission_keys(),
            vec!["User.Read"]
        );
    }
}
