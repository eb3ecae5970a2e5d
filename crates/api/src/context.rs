use doorsales_core::UserId;

/// Authenticated identity for a request, inserted by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    login: String,
}

impl PrincipalContext {
    pub fn new(user_id: UserId, login: impl Into<String>) -> Self {
        Self {
            user_id,
            login: login.into(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn login(&self) -> &str {
        &self.login
    }
}
