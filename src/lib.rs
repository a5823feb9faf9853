pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod otel;
pub mod routes;
pub mod service;
pub mod state;
pub mod telemetry;

use sqlx::PgPool;

use crate::{db::Database, service::UserService, state::AppState};

/// Router wired to the given pool.
pub fn app(pool: PgPool) -> axum::Router {
    let users = UserService::new(Database::new(pool));
    routes::create_router(AppState::new(users))
}
