use axum::{http::StatusCode, response::Response, routing::get, Router};

use crate::app::dto::ApiResponse;

pub mod system;
pub mod users;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health).fallback(not_found))
        .nest("/users", users::router())
}

/// Unmatched path or method.
pub async fn not_found() -> Response {
    ApiResponse::failure("Route not found").with_status(StatusCode::NOT_FOUND)
}
