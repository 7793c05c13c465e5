//! Effective permission resolution from role memberships.

use std::collections::BTreeSet;

use gatehouse_entity::identity::Identity;

/// Aggregates the permission keys an identity holds through its roles.
#[derive(Debug, Clone, Default)]
pub struct PermissionResolver;

impl PermissionResolver {
    /// Creates a new resolver.
    pub fn new() -> Self {
        Self
    }

    /// Returns the deduplicated union of permission keys across the
    /// identity's roles.
    ///
    /// Pure: no side effects, no storage access. The identity's roles and
    /// their permissions must already be loaded. An identity with no roles
    /// resolves to the empty set, never an error. The `BTreeSet` keeps the
    /// set sorted so serializing it into a claim is reproducible across
    /// reissues.
    pub fn resolve(&self, identity: &Identity) -> BTreeSet<String> {
        identity
            .roles
            .iter()
            .flat_map(|role| role.permissions.iter())
            .map(|permission| permission.key.clone())
            .collect()
    }
}
