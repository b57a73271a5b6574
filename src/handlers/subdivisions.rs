use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;

use crate::database;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::query::ListParams;
use crate::services::subdivisions;

/// GET /api/subdivisions/plots/:plot_id
pub async fn list(
    Extension(auth): Extension<AuthUser>,
    Path(plot_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let (rows, count) = subdivisions::list(pool, auth.user_id, &plot_id, &params).await?;
    Ok(Json(json!({ "subdivisions": rows, "count": count })))
}

/// POST /api/subdivisions/plots/:plot_id
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    Path(plot_id): Path<String>,
    Json(body): Json<subdivisions::NewSubdivision>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let subdivision = subdivisions::create(pool, auth.user_id, &plot_id, body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "subdivision": subdivision }))))
}

/// GET /api/subdivisions/:subdivision_id
pub async fn get(
    Extension(auth): Extension<AuthUser>,
    Path(subdivision_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let subdivision = subdivisions::get(pool, auth.user_id, &subdivision_id).await?;
    Ok(Json(json!({ "subdivision": subdivision })))
}

/// PATCH /api/subdivisions/:subdivision_id
pub async fn update(
    Extension(auth): Extension<AuthUser>,
    Path(subdivision_id): Path<String>,
    Json(body): Json<subdivisions::UpdateSubdivision>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let subdivision = subdivisions::update(pool, auth.user_id, &subdivision_id, body).await?;
    Ok(Json(json!({ "subdivision": subdivision })))
}

/// DELETE /api/subdivisions/:subdivision_id
pub async fn delete(
    Extension(auth): Extension<AuthUser>,
    Path(subdivision_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    subdivisions::delete(pool, auth.user_id, &subdivision_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
