use axum::{Router, routing::get};
use axum_tracing_opentelemetry::middleware::{OtelAxumLayer, OtelInResponseLayer};

use crate::{
    handlers::{add_user, delete_user, get_user, get_users, health, update_user},
    state::AppState,
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/users", get(get_users).post(add_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/health", get(health))
        .layer(OtelInResponseLayer::default())
        .layer(OtelAxumLayer::default())
        .with_state(state)
}
