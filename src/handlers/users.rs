use axum::{extract::Path, http::StatusCode, response::IntoResponse, Extension, Json};
use serde_json::json;

use crate::database;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::users;

/// GET /api/users - admin only
pub async fn list(Extension(auth): Extension<AuthUser>) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let rows = users::list(pool, &auth).await?;
    Ok(Json(json!({ "users": rows })))
}

/// GET /api/users/:username
pub async fn get(
    Extension(auth): Extension<AuthUser>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let user = users::get(pool, &auth, &username).await?;
    Ok(Json(json!({ "user": user })))
}

/// PATCH /api/users/:username
pub async fn update(
    Extension(auth): Extension<AuthUser>,
    Path(username): Path<String>,
    Json(body): Json<users::UpdateUser>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let user = users::update(pool, &auth, &username, body).await?;
    Ok(Json(json!({ "user": user })))
}

/// PATCH /api/users/:username/password
pub async fn change_password(
    Extension(auth): Extension<AuthUser>,
    Path(username): Path<String>,
    Json(body): Json<users::ChangePassword>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    users::change_password(pool, &auth, &username, body).await?;
    Ok(Json(json!({ "message": "Password updated" })))
}

/// DELETE /api/users/:username
pub async fn delete(
    Extension(auth): Extension<AuthUser>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    users::delete(pool, &auth, &username).await?;
    Ok(StatusCode::NO_CONTENT)
}
