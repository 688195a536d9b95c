//! Health check endpoint.

use actix_web::{HttpResponse, web};
use folio_shared::dto::HealthResponse;

use crate::state::AppState;

/// Health check endpoint - returns server status and the wired backends.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        posts_backend: state.posts.backend_name().to_string(),
        content_store: state.content.store_name().to_string(),
    };

    HttpResponse::Ok().json(response)
}
