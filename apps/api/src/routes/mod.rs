pub mod health;
pub mod links;
pub mod pages;

use axum::{
    routing::{get, post},
    Router,
};

use crate::profiles::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index_page))
        .route("/health", get(health::health_handler))
        // Link issuance and validation
        .route("/send-upload-link", post(links::handle_send_link))
        .route("/status/:token", get(links::handle_status))
        .route("/profile/:token", get(pages::profile_form_page))
        // Profile API
        .route("/api/update-profile", post(handlers::handle_update_profile))
        .route("/api/profiles", get(handlers::handle_list_profiles))
        .route("/api/profiles/:id", get(handlers::handle_get_profile))
        .with_state(state)
}
