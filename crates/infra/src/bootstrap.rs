//! First-run creation of the administrator account.

use thiserror::Error;
use tracing::instrument;

use doorsales_auth::{PasswordError, PasswordHasher};
use doorsales_core::UserId;

use crate::error::RepositoryError;
use crate::users::UserStore;

pub const DEFAULT_ADMIN_LOGIN: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created(UserId),
    AlreadyPresent,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to look up admin user: {0}")]
    Lookup(#[source] RepositoryError),

    #[error("failed to hash admin password: {0}")]
    Hash(#[source] PasswordError),

    #[error("failed to create admin user: {0}")]
    Create(#[source] RepositoryError),
}

/// Make sure the `admin` account exists. Safe to call on every start.
#[instrument(skip(store, hasher), err)]
pub async fn ensure_default_admin(
    store: &dyn UserStore,
    hasher: &PasswordHasher,
) -> Result<BootstrapOutcome, BootstrapError> {
    if store
        .find_by_login(DEFAULT_ADMIN_LOGIN)
        .await
        .map_err(BootstrapError::Lookup)?
        .is_some()
    {
        tracing::info!(login = DEFAULT_ADMIN_LOGIN, "admin user already present");
        return Ok(BootstrapOutcome::AlreadyPresent);
    }

    let hash = hasher
        .hash(DEFAULT_ADMIN_PASSWORD.to_string())
        .await
        .map_err(BootstrapError::Hash)?;

    match store.create(DEFAULT_ADMIN_LOGIN, &hash).await {
        Ok(user) => {
            tracing::warn!(
                login = DEFAULT_ADMIN_LOGIN,
                user_id = user.id.get(),
                "created admin user with default password; change it before exposing this service"
            );
            Ok(BootstrapOutcome::Created(user.id))
        }
        // Another instance won the race.
        Err(RepositoryError::Conflict(_)) => Ok(BootstrapOutcome::AlreadyPresent),
        Err(e) => Err(BootstrapError::Create(e)),
    }
}
