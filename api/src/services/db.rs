//! Database pool and migrations
//!
//! Domain functions use sqlx's generic Executor trait, so they accept both
//! `&PgPool` and `&mut PgConnection` (transactions):
//!
//! ```ignore
//! use sqlx::{Executor, Postgres};
//!
//! pub async fn my_query<'e, E>(executor: E, id: i64) -> Result<MyType, sqlx::Error>
//! where
//!     E: Executor<'e, Database = Postgres>,
//! {
//!     sqlx::query_as("SELECT * FROM my_table WHERE id = $1")
//!         .bind(id)
//!         .fetch_one(executor)
//!         .await
//! }
//! ```
//!
//! Every write in this service is a single statement, so routes call domain
//! functions with `&state.db` directly.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;

/// Open the connection pool
pub async fn connect(config: &AppConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
}

/// Apply the embedded migrations under `migrations/`
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
