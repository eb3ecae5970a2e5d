//! Stored credential record.

use chrono::{DateTime, Utc};

use doorsales_core::UserId;

use crate::{PasswordHash, Principal};

/// A login/password identity.
///
/// Created once at bootstrap; no operation mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub login: String,
    pub password_hash: PasswordHash,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn principal(&self) -> Principal {
        Principal::new(self.id, self.login.clone())
    }
}

