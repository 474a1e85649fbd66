use axum::{Router, routing::post};

use super::controller::{forgot_password, login, login_guest, refresh_token, reset_password};
use crate::state::AppState;

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/login-guest", post(login_guest))
        .route("/refresh-token", post(refresh_token))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}
