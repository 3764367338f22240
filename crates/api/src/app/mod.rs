//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the injected application state (storage handle, mode)
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: the response envelope
//! - `errors.rs`: request failures and how they render

use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppState;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Layers, outermost first: request logging, CORS, security headers, then the
/// fault handler that guarantees a JSON envelope for every failure.
pub fn build_app(state: AppState) -> Router {
    let environment = state.environment;

    Router::new()
        .nest("/api", routes::router())
        .fallback(routes::not_found)
        .layer(Extension(state))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::log_requests))
                .layer(axum::middleware::from_fn(middleware::cors))
                .layer(axum::middleware::from_fn(middleware::security_headers))
                .layer(axum::middleware::from_fn_with_state(
                    environment,
                    middleware::handle_faults,
                )),
        )
}
