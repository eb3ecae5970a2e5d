//! Administrator credential storage.

use std::sync::Arc;

use doorsales_auth::{PasswordHash, User};

use crate::error::RepositoryError;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;

/// Lookup and creation of users. Logins are unique.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError>;

    /// `Conflict` when the login is taken.
    async fn create(&self, login: &str, password_hash: &PasswordHash) -> Result<User, RepositoryError>;
}

#[async_trait::async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError> {
        (**self).find_by_login(login).await
    }

    async fn create(&self, login: &str, password_hash: &PasswordHash) -> Result<User, RepositoryError> {
        (**self).create(login, password_hash).await
    }
}
