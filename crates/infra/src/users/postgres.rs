use std::sync::Arc;

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use doorsales_auth::{PasswordHash, User};
use doorsales_core::UserId;

use super::UserStore;
use crate::error::{RepositoryError, map_sqlx_error};

#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: Arc<PgPool>,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

struct UserRow(User);

impl<'r> FromRow<'r, PgRow> for UserRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow(User {
            id: UserId::new(row.try_get("id")?),
            login: row.try_get("login")?,
            password_hash: PasswordHash::from_phc(row.try_get::<String, _>("password_hash")?),
            created_at: row.try_get("created_at")?,
        }))
    }
}

#[async_trait::async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self), err)]
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, login, password_hash, created_at FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user", e))?;

        row.map(|r| UserRow::from_row(&r).map(|u| u.0))
            .transpose()
            .map_err(|e| map_sqlx_error("decode_user", e))
    }

    #[instrument(skip(self, password_hash), err)]
    async fn create(&self, login: &str, password_hash: &PasswordHash) -> Result<User, RepositoryError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (login, password_hash)
            VALUES ($1, $2)
            RETURNING id, login, password_hash, created_at
            "#,
        )
        .bind(login)
        .bind(password_hash.as_str())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;

        UserRow::from_row(&row)
            .map(|u| u.0)
            .map_err(|e| map_sqlx_error("decode_user", e))
    }
}
