//! Infrastructure layer: Postgres connection and schema, repositories,
//! and first-run bootstrap.

pub mod bootstrap;
pub mod db;
pub mod error;
pub mod orders;
pub mod users;

mod integration_tests;

pub use bootstrap::{BootstrapError, BootstrapOutcome, ensure_default_admin};
pub use db::DbSettings;
pub use error::RepositoryError;
pub use orders::{InMemoryOrderRepository, OrderRepository, PostgresOrderRepository};
pub use users::{InMemoryUserStore, PostgresUserStore, UserStore};
