use opentelemetry::{global, metrics::Counter};

use crate::service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub metrics: UserMetrics,
}

impl AppState {
    pub fn new(users: UserService) -> Self {
        Self {
            users,
            metrics: UserMetrics::new(),
        }
    }
}

/// Counters on the global meter; no-ops until a meter provider is installed.
#[derive(Clone)]
pub struct UserMetrics {
    pub users_created: Counter<u64>,
    pub users_updated: Counter<u64>,
    pub users_deleted: Counter<u64>,
}

impl UserMetrics {
    pub fn new() -> Self {
        let meter = global::meter("user-api");
        Self {
            users_created: meter
                .u64_counter("users_created")
                .with_description("Users created through the API")
                .build(),
            users_updated: meter
                .u64_counter("users_updated")
                .with_description("User update requests served")
                .build(),
            users_deleted: meter
                .u64_counter("users_deleted")
                .with_description("User delete requests served")
                .build(),
        }
    }
}

impl Default for UserMetrics {
    fn default() -> Self {
        Self::new()
    }
}
