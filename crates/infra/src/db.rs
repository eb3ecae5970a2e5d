//! Postgres connection pool and schema bootstrap.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use tracing::instrument;

/// Connection parameters for the orders database.
#[derive(Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
}

impl DbSettings {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(PgSslMode::Disable)
            .options([("timezone", "UTC")])
    }
}

impl core::fmt::Debug for DbSettings {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DbSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Open the connection pool. Fails if the server is unreachable.
#[instrument(skip(settings), fields(host = %settings.host, port = settings.port, database = %settings.database), err)]
pub async fn connect(settings: &DbSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(settings.connect_options())
        .await
}

/// Idempotent DDL for users, orders, and doors.
///
/// `doors.order_id` cascades on delete, so removing an order removes its doors.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            BIGSERIAL PRIMARY KEY,
        login         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id         BIGSERIAL PRIMARY KEY,
        customer   TEXT NOT NULL,
        phone      TEXT NOT NULL,
        date       TEXT NOT NULL,
        count      BIGINT NOT NULL,
        price      NUMERIC(14, 2) NOT NULL,
        prepayment NUMERIC(14, 2) NOT NULL,
        comment    TEXT,
        status     TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS doors (
        id        BIGSERIAL PRIMARY KEY,
        order_id  BIGINT NOT NULL REFERENCES orders (id) ON DELETE CASCADE,
        door_type TEXT NOT NULL,
        model     TEXT NOT NULL,
        price     NUMERIC(14, 2) NOT NULL,
        color     TEXT NOT NULL,
        width     INTEGER NOT NULL,
        height    INTEGER NOT NULL,
        leaf_type TEXT NOT NULL,
        count     INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_doors_order_id ON doors (order_id)",
];

#[instrument(skip(pool), err)]
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!(tables = 3, "database schema ready");
    Ok(())
}
