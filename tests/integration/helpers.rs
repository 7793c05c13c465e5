//! Shared test helpers for integration tests.
//!
//! Requires a reachable PostgreSQL instance; see config/test.toml.
//! Migration, cleanup, and seeding run once per test binary; individual
//! tests keep to their own uniquely-named identities so they can run in
//! parallel.

#![allow(dead_code)]

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::OnceCell;
use uuid::Uuid;

use gatehouse_auth::credential::{CredentialIssuer, CredentialVerifier};
use gatehouse_auth::password::{PasswordHasher, PasswordValidator};
use gatehouse_auth::permission::AuthorizationEvaluator;
use gatehouse_core::config::AppConfig;
use gatehouse_database::repositories::identity::IdentityRepository;
use gatehouse_database::repositories::role::RoleRepository;
use gatehouse_database::seeding;
use gatehouse_entity::identity::Identity;
use gatehouse_service::auth::{AuthService, RefreshSessionStore};
use gatehouse_service::identity::{CreateIdentityRequest, IdentityLifecycleManager};
use gatehouse_service::notify::ChannelNotificationDispatcher;

/// Password of the seeded admin identity.
pub const ADMIN_PASSWORD: &str = "Rq7#Kv2pXw9z";

/// Password used for identities created by tests.
pub const TEST_PASSWORD: &str = "Vx9#Tq4mPl2w";

static SETUP: OnceCell<()> = OnceCell::const_new();

/// Test application context wiring the full service stack.
pub struct TestApp {
    /// Application config loaded for the `test` environment.
    pub config: AppConfig,
    /// Database pool for direct queries.
    pub pool: PgPool,
    /// Identity repository.
    pub identity_repo: Arc<IdentityRepository>,
    /// Role repository.
    pub role_repo: Arc<RoleRepository>,
    /// Identity lifecycle operations.
    pub lifecycle: IdentityLifecycleManager,
    /// Login/refresh flows.
    pub auth: AuthService,
    /// Refresh session ownership.
    pub sessions: Arc<RefreshSessionStore>,
    /// Access credential verification.
    pub verifier: CredentialVerifier,
    /// Claim-based authorization.
    pub evaluator: AuthorizationEvaluator,
    /// Notification fan-out.
    pub dispatcher: Arc<ChannelNotificationDispatcher>,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let config = AppConfig::load("test").expect("Failed to load test config");

        let pool = gatehouse_database::connection::DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database")
            .into_pool();

        SETUP
            .get_or_init(|| async {
                gatehouse_database::migration::run_migrations(&pool)
                    .await
                    .expect("Failed to run migrations");

                clean_database(&pool).await;

                let admin_hash = PasswordHasher::new()
                    .hash(ADMIN_PASSWORD)
                    .expect("Failed to hash admin password");
                seeding::seed(&pool, &admin_hash)
                    .await
                    .expect("Failed to seed database");
            })
            .await;

        let identity_repo = Arc::new(IdentityRepository::new(pool.clone()));
        let role_repo = Arc::new(RoleRepository::new(pool.clone()));
        let hasher = Arc::new(PasswordHasher::new());
        let validator = Arc::new(PasswordValidator::new(&config.auth));
        let dispatcher = Arc::new(ChannelNotificationDispatcher::new());
        let issuer = Arc::new(CredentialIssuer::new(&config.auth));

        let sessions = Arc::new(RefreshSessionStore::new(
            Arc::clone(&identity_repo),
            Arc::clone(&issuer),
            &config.auth,
        ));

        let auth = AuthService::new(
            Arc::clone(&identity_repo),
            Arc::clone(&hasher),
            Arc::clone(&issuer),
            Arc::clone(&sessions),
        );

        let lifecycle = IdentityLifecycleManager::new(
            Arc::clone(&identity_repo),
            Arc::clone(&role_repo),
            hasher,
            validator,
            Arc::clone(&dispatcher) as Arc<dyn gatehouse_core::traits::NotificationDispatcher>,
        );

        let verifier = CredentialVerifier::new(&config.auth);
        let evaluator = AuthorizationEvaluator::new();

        Self {
            config,
            pool,
            identity_repo,
            role_repo,
            lifecycle,
            auth,
            sessions,
            verifier,
            evaluator,
            dispatcher,
        }
    }

    /// Create a test identity with the shared test password
    pub async fn create_identity(
        &self,
        username: &str,
        email: &str,
        role_ids: Vec<Uuid>,
    ) -> Identity {
        self.lifecycle
            .create(CreateIdentityRequest {
                username: username.to_string(),
                email: email.to_string(),
                password: TEST_PASSWORD.to_string(),
                role_ids,
            })
            .await
            .expect("Failed to create test identity")
    }

    /// Look up the seeded SuperAdmin role's ID
    pub async fn super_admin_role_id(&self) -> Uuid {
        self.role_repo
            .find_by_name(seeding::SUPER_ADMIN_ROLE)
            .await
            .expect("Failed to query SuperAdmin role")
            .expect("SuperAdmin role not seeded")
            .id
    }

    /// Force the identity's stored refresh session to be expired
    pub async fn expire_refresh_session(&self, identity_id: Uuid) {
        sqlx::query("UPDATE identities SET refresh_token_expires_at = NOW() WHERE id = $1")
            .bind(identity_id)
            .execute(&self.pool)
            .await
            .expect("Failed to expire refresh session");
    }
}

/// Generate a unique email so parallel tests never collide
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@test.com", prefix, Uuid::new_v4().simple())
}

/// Generate a unique username
pub fn unique_username(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

/// Remove all rows from every table, children first
async fn clean_database(pool: &PgPool) {
    let tables = [
        "identity_roles",
        "role_permissions",
        "identities",
        "roles",
        "permissions",
    ];

    for table in &tables {
        let query = format!("DELETE FROM {}", table);
        let _ = sqlx::query(&query).execute(pool).await;
    }
}
