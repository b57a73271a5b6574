use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::database;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::query::ListParams;
use crate::services::plots;

#[derive(Debug, Deserialize)]
pub struct PinRequest {
    #[serde(rename = "isPinned")]
    pub is_pinned: bool,
}

/// GET /api/plots/users/:owner_id
pub async fn list(
    Extension(auth): Extension<AuthUser>,
    Path(owner_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let (rows, count) = plots::list(pool, auth.user_id, &owner_id, &params).await?;
    Ok(Json(json!({ "plots": rows, "count": count })))
}

/// POST /api/plots/users/:owner_id
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    Path(owner_id): Path<String>,
    Json(body): Json<plots::NewPlot>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let plot = plots::create(pool, auth.user_id, &owner_id, body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "plot": plot }))))
}

/// GET /api/plots/:plot_id
pub async fn get(
    Extension(auth): Extension<AuthUser>,
    Path(plot_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let plot = plots::get(pool, auth.user_id, &plot_id).await?;
    Ok(Json(json!({ "plot": plot })))
}

/// PATCH /api/plots/:plot_id
pub async fn update(
    Extension(auth): Extension<AuthUser>,
    Path(plot_id): Path<String>,
    Json(body): Json<plots::UpdatePlot>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let plot = plots::update(pool, auth.user_id, &plot_id, body).await?;
    Ok(Json(json!({ "plot": plot })))
}

/// DELETE /api/plots/:plot_id
pub async fn delete(
    Extension(auth): Extension<AuthUser>,
    Path(plot_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    plots::delete(pool, auth.user_id, &plot_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/plots/:plot_id/pin
pub async fn pin(
    Extension(auth): Extension<AuthUser>,
    Path(plot_id): Path<String>,
    Json(body): Json<PinRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let plot = plots::pin(pool, auth.user_id, &plot_id, body.is_pinned).await?;
    Ok(Json(json!({ "plot": plot })))
}

/// PATCH /api/plots/:plot_id/unpin
pub async fn unpin(
    Extension(auth): Extension<AuthUser>,
    Path(plot_id): Path<String>,
    Json(body): Json<PinRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let plot = plots::unpin(pool, auth.user_id, &plot_id, body.is_pinned).await?;
    Ok(Json(json!({ "plot": plot })))
}
