use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use doorsales_auth::{PasswordHash, User};
use doorsales_core::UserId;

use super::UserStore;
use crate::error::{RepositoryError, lock_poisoned};

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    by_login: HashMap<String, User>,
}

/// In-memory user store (tests/dev).
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    state: RwLock<State>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError> {
        let state = self.state.read().map_err(|_| lock_poisoned())?;
        Ok(state.by_login.get(login).cloned())
    }

    async fn create(&self, login: &str, password_hash: &PasswordHash) -> Result<User, RepositoryError> {
        let mut state = self.state.write().map_err(|_| lock_poisoned())?;
        if state.by_login.contains_key(login) {
            return Err(RepositoryError::Conflict(format!("login {login:?} already exists")));
        }

        state.last_id += 1;
        let user = User {
            id: UserId::new(state.last_id),
            login: login.to_string(),
            password_hash: password_hash.clone(),
            created_at: Utc::now(),
        };
        state.by_login.insert(user.login.clone(), user.clone());
        Ok(user)
    }
}
