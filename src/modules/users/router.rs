use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{create_user, delete_user, get_user, get_users, update_user};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(get_users))
        .route("/user/create", post(create_user))
        .route(
            "/user/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}
