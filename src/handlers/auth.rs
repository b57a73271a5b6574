use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use serde_json::json;

use crate::database;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::users;

/// POST /api/register
pub async fn register(
    Json(body): Json<users::RegisterUser>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let user = users::register(pool, body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

/// POST /api/login
pub async fn login(Json(body): Json<users::LoginRequest>) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let (token, user) = users::login(pool, body).await?;
    Ok(Json(json!({ "token": token, "user": user })))
}

/// GET /api/auth - verify the bearer token and echo the identity
pub async fn check(Extension(auth): Extension<AuthUser>) -> impl IntoResponse {
    Json(json!({
        "user": { "user_id": auth.user_id, "username": auth.username }
    }))
}
