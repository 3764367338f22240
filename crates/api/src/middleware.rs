//! Cross-cutting HTTP concerns: request logging, CORS, security headers and
//! the final fault handler.

use std::any::Any;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::errors::{self, FailureDetail};
use crate::config::Environment;

const CROSS_ORIGIN_RESOURCE_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-resource-policy");

/// One structured log line per request.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    if response.status().is_server_error() {
        tracing::warn!(%method, %path, status, latency_ms, "request failed");
    } else {
        tracing::info!(%method, %path, status, latency_ms, "request");
    }

    response
}

/// Permissive cross-origin access. Preflights are answered here and never
/// reach the router.
pub async fn cors(req: Request, next: Next) -> Response {
    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));

    response
}

pub async fn security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;

    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("0"));
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=15552000; includeSubDomains"),
    );
    headers.insert(
        CROSS_ORIGIN_RESOURCE_POLICY,
        HeaderValue::from_static("same-origin"),
    );

    response
}

/// Last line of defence: every failure leaves as a JSON envelope.
///
/// The downstream stack runs in its own task so a panicking handler becomes a
/// 500 response instead of a dropped connection. Internal failure detail is
/// always logged, and only echoed to the client in development.
pub async fn handle_faults(
    State(environment): State<Environment>,
    req: Request,
    next: Next,
) -> Response {
    let response = match tokio::spawn(next.run(req)).await {
        Ok(response) => response,
        Err(join_err) => {
            let detail = if join_err.is_panic() {
                panic_message(join_err.into_panic())
            } else {
                "request task was cancelled".to_string()
            };
            tracing::error!(%detail, "request handler panicked");
            return render_internal(environment, detail);
        }
    };

    let detail = response
        .extensions()
        .get::<FailureDetail>()
        .map(|FailureDetail(detail)| detail.clone());
    match detail {
        Some(detail) => {
            tracing::error!(%detail, "request failed with an internal error");
            if environment.exposes_failure_detail() {
                render_internal(environment, detail)
            } else {
                response
            }
        }
        None => response,
    }
}

fn render_internal(environment: Environment, detail: String) -> Response {
    let message = if environment.exposes_failure_detail() {
        detail
    } else {
        errors::INTERNAL_ERROR_MESSAGE.to_string()
    };
    errors::internal_error_response(message)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
