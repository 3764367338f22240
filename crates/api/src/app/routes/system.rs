use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::app::dto::ApiResponse;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
}

/// Liveness probe. Deliberately independent of storage.
pub async fn health() -> ApiResponse<HealthStatus> {
    ApiResponse::ok_with_message(
        "Server is running",
        HealthStatus {
            status: "ok",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        },
    )
}
