use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use userbase_core::{UserId, UserPayload};

use crate::app::dto::{ApiResponse, CreatedUser};
use crate::app::errors::ApiError;
use crate::app::routes::not_found;
use crate::app::services::AppState;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user).fallback(not_found))
        .route(
            "/:id",
            get(get_user)
                .put(update_user)
                .delete(delete_user)
                .fallback(not_found),
        )
}

/// Ids that cannot name a stored user resolve to "not found".
fn parse_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse().map_err(|_| ApiError::user_not_found())
}

pub async fn list_users(Extension(state): Extension<AppState>) -> Result<Response, ApiError> {
    let users = state.store.list().await?;
    Ok(ApiResponse::ok(users).into_response())
}

pub async fn get_user(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let user = state
        .store
        .get(id)
        .await?
        .ok_or_else(ApiError::user_not_found)?;
    Ok(ApiResponse::ok(user).into_response())
}

pub async fn create_user(
    Extension(state): Extension<AppState>,
    body: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = body?;
    let details = payload.validate()?;

    let id = state.store.create(&details).await?;
    tracing::info!(user_id = %id, "user created");

    Ok(ApiResponse::ok_with_message("User created successfully", CreatedUser { id })
        .with_status(StatusCode::CREATED))
}

pub async fn update_user(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = body?;
    let details = payload.validate()?;
    let id = parse_id(&id)?;

    if !state.store.update(id, &details).await? {
        return Err(ApiError::user_not_found());
    }
    tracing::info!(user_id = %id, "user updated");

    Ok(ApiResponse::confirmed("User updated successfully").into_response())
}

pub async fn delete_user(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;

    if !state.store.delete(id).await? {
        return Err(ApiError::user_not_found());
    }
    tracing::info!(user_id = %id, "user deleted");

    Ok(ApiResponse::confirmed("User deleted successfully").into_response())
}
