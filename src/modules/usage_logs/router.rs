use axum::{Router, routing::get};

use super::controller::{delete_usage_log, get_usage_log, get_usage_logs};
use crate::state::AppState;

pub fn init_usage_logs_router() -> Router<AppState> {
    Router::new()
        .route("/user-service-logs", get(get_usage_logs))
        .route(
            "/user-service-logs/{id}",
            get(get_usage_log).delete(delete_usage_log),
        )
}
