use axum::{
    Router,
    routing::{get, patch, post},
};

use super::controller::{
    create_service, delete_service, get_marketing_services, get_organization_services,
    get_service, get_services, heartbeat, set_availability_to_organization, update_service,
    use_service,
};
use crate::state::AppState;

pub fn init_services_router() -> Router<AppState> {
    Router::new()
        .route("/services", get(get_services).post(create_service))
        .route("/services/marketing", get(get_marketing_services))
        .route("/services/heartbeat", patch(heartbeat))
        .route(
            "/services/{id}",
            get(get_service).put(update_service).delete(delete_service),
        )
        .route("/services/{id}/use", post(use_service))
        .route(
            "/services/{id}/organization/{org_id}",
            post(set_availability_to_organization),
        )
        .route(
            "/organizations/{id}/services",
            get(get_organization_services),
        )
}
