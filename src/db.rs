use anyhow::Context;
use sqlx::{
    PgPool,
    postgres::{PgArguments, PgPoolOptions, PgRow},
    query::Query,
    Postgres,
};

use crate::config::DatabaseConfig;

pub async fn create_pool(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    pool_options(config)
        .connect_with(config.connect_options())
        .await
        .context("Failed to connect to DB")
}

/// Same pool, but no connection is opened until the first statement runs.
pub fn create_lazy_pool(config: &DatabaseConfig) -> PgPool {
    pool_options(config).connect_lazy_with(config.connect_options())
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    // Every checkout is pinged first; dead connections are dropped and replaced.
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .test_before_acquire(true)
}

pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("constraint violated: {0}")]
    Constraint(#[source] sqlx::Error),

    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("malformed value in column {column}: {value:?}")]
    Decode { column: &'static str, value: String },

    #[error("user '{id}' not found")]
    NotFound { id: String },
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => Self::Unavailable(e),
            sqlx::Error::Database(db) if is_unavailable_code(db.code().as_deref()) => {
                Self::Unavailable(e)
            }
            sqlx::Error::Database(db)
                if db.constraint().is_some() || is_constraint_code(db.code().as_deref()) =>
            {
                Self::Constraint(e)
            }
            _ => Self::Query(e),
        }
    }
}

/// SQLSTATEs the server reports when a connection can't be established or
/// used: 08 connection exception, 28 invalid authorization, 3D invalid
/// catalog (missing database), 53 insufficient resources, 57P operator
/// intervention (shutdown, cannot connect now).
fn is_unavailable_code(code: Option<&str>) -> bool {
    code.is_some_and(|c| {
        ["08", "28", "3D", "53", "57P"]
            .iter()
            .any(|class| c.starts_with(*class))
    })
}

/// SQLSTATE class 23 is "integrity constraint violation".
fn is_constraint_code(code: Option<&str>) -> bool {
    code.is_some_and(|c| c.starts_with("23"))
}

/// A positional statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for SqlParam {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

/// Thin wrapper around the pool exposing the two statement primitives the
/// user store needs. Each call holds a pooled connection only for the
/// duration of its statement.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<PgRow>, DbError> {
        let rows = bind_all(sqlx::query(sql), params)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Runs a data-modifying statement and returns the number of affected rows.
    pub async fn update(&self, sql: &str, params: &[SqlParam]) -> Result<u64, DbError> {
        let result = bind_all(sqlx::query(sql), params)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[SqlParam],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            SqlParam::Text(value) => query.bind(value.clone()),
            SqlParam::Int(value) => query.bind(*value),
        };
    }
    query
}
