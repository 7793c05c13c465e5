//! Claim-based authorization decisions.

use crate::credential::AccessClaims;

/// Decides allow/deny from a verified credential's claims.
///
/// A pure function of the claim set and required permission: it never
/// performs a storage lookup, so a role or permission change takes effect
/// only once a fresh credential is issued. The access-token TTL is the
/// upper bound on that staleness.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationEvaluator;

impl AuthorizationEvaluator {
    /// Creates a new evaluator.
    pub fn new() -> Self {
        Self
    }

    /// Allows if and only if the required permission appears in the
    /// credential's permission claim by exact string match.
    ///
    /// Fails closed: a missing or empty claim denies. No wildcard or
    /// hierarchy matching.
    pub fn authorize(&self, claims: &AccessClaims, required_permission: &str) -> bool {
        claims
            .permission_keys()
            .iter()
            .any(|key| *key == required_permission)
    }
}
