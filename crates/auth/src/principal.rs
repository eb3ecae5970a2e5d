use serde::{Deserialize, Serialize};

use doorsales_core::UserId;

/// Authenticated identity carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub login: String,
}

impl Principal {
    pub fn new(user_id: UserId, login: impl Into<String>) -> Self {
        Self {
            user_id,
            login: login.into(),
        }
    }
}
