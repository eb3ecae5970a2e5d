//! Service wiring: repositories, credential checks, and token issuing.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use doorsales_auth::{
    Hs256TokenService, JwtIssuer, JwtValidator, PasswordError, PasswordHash, PasswordHasher, TokenError,
};
use doorsales_infra::{
    BootstrapError, BootstrapOutcome, InMemoryOrderRepository, InMemoryUserStore, OrderRepository,
    PostgresOrderRepository, PostgresUserStore, RepositoryError, UserStore, ensure_default_admin,
};

use crate::config::Config;

/// Password compared against when the login is unknown, so a miss costs
/// about as much as a wrong password.
const DUMMY_PASSWORD: &str = "not-a-real-password";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid login or password")]
    InvalidCredentials,

    #[error("user lookup failed: {0}")]
    Storage(#[from] RepositoryError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

#[derive(Debug, Error)]
pub enum ServicesError {
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error("failed to prepare password hasher: {0}")]
    Password(#[from] PasswordError),
}

/// Login: credential check plus token issue.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    issuer: Arc<dyn JwtIssuer>,
    dummy_hash: PasswordHash,
}

impl AuthService {
    pub async fn new(
        users: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        issuer: Arc<dyn JwtIssuer>,
    ) -> Result<Self, PasswordError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD.to_string()).await?;
        Ok(Self {
            users,
            hasher,
            issuer,
            dummy_hash,
        })
    }

    #[instrument(skip(self, password), err(level = "warn"))]
    pub async fn login(&self, login: &str, password: String) -> Result<String, AuthError> {
        let Some(user) = self.users.find_by_login(login).await? else {
            // Same work as the hit path; the result is irrelevant.
            let _ = self.hasher.verify(password, self.dummy_hash.clone()).await;
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password, user.password_hash.clone()).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issuer.issue(&user.principal(), Utc::now())?;
        tracing::info!(user_id = user.id.get(), "login succeeded");
        Ok(token)
    }
}

/// Everything the handlers need, shared behind an `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<dyn OrderRepository>,
    pub auth: AuthService,
    pub tokens: Arc<dyn JwtValidator>,
}

/// Postgres-backed services. The schema must already exist.
pub async fn build_postgres_services(
    config: &Config,
    pool: PgPool,
    hasher: PasswordHasher,
) -> Result<AppServices, ServicesError> {
    let users: Arc<dyn UserStore> = Arc::new(PostgresUserStore::new(pool.clone()));
    let orders: Arc<dyn OrderRepository> = Arc::new(PostgresOrderRepository::new(pool));
    assemble(config, users, orders, hasher).await
}

/// In-memory services for tests and local experiments. Nothing persists.
pub async fn build_in_memory_services(
    config: &Config,
    hasher: PasswordHasher,
) -> Result<AppServices, ServicesError> {
    let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
    let orders: Arc<dyn OrderRepository> = Arc::new(InMemoryOrderRepository::new());
    assemble(config, users, orders, hasher).await
}

async fn assemble(
    config: &Config,
    users: Arc<dyn UserStore>,
    orders: Arc<dyn OrderRepository>,
    hasher: PasswordHasher,
) -> Result<AppServices, ServicesError> {
    match ensure_default_admin(users.as_ref(), &hasher).await? {
        BootstrapOutcome::Created(id) => tracing::info!(user_id = id.get(), "admin user created"),
        BootstrapOutcome::AlreadyPresent => {}
    }

    let tokens = Arc::new(Hs256TokenService::new(config.jwt_secret.as_bytes(), config.jwt_ttl));
    let auth = AuthService::new(users, hasher, tokens.clone()).await?;

    Ok(AppServices {
        orders,
        auth,
        tokens,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::from_lookup(|key| {
            let value = match key {
                "DB_HOST" => "localhost",
                "DB_PORT" => "5432",
                "DB_USER" => "doors",
                "DB_NAME" => "doors",
                "JWT_SECRET" => "unit-test-secret",
                _ => return None,
            };
            Some(value.to_string())
        })
        .unwrap()
    }

    async fn services() -> AppServices {
        build_in_memory_services(&config(), PasswordHasher::with_params(1024, 1, 1).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn admin_can_log_in_and_token_validates() {
        let services = services().await;
        let token = services.auth.login("admin", "admin".to_string()).await.unwrap();

        let claims = services.tokens.validate(&token, Utc::now()).unwrap();
        assert_eq!(claims.login, "admin");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let services = services().await;

        let wrong = services.auth.login("admin", "nope".to_string()).await.unwrap_err();
        let unknown = services.auth.login("ghost", "admin".to_string()).await.unwrap_err();

        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }
}
