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
use crate::services::jobs;

/// GET /api/jobs/plots/:plot_id
pub async fn list_of_plot(
    Extension(auth): Extension<AuthUser>,
    Path(plot_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let (rows, count) = jobs::list_of_plot(pool, auth.user_id, &plot_id, &params).await?;
    Ok(Json(json!({ "jobs": rows, "count": count })))
}

/// POST /api/jobs/plots/:plot_id
pub async fn create_in_plot(
    Extension(auth): Extension<AuthUser>,
    Path(plot_id): Path<String>,
    Json(body): Json<jobs::NewJob>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let job = jobs::create_in_plot(pool, auth.user_id, &plot_id, body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "job": job }))))
}

/// GET /api/jobs/:job_id
pub async fn get(
    Extension(auth): Extension<AuthUser>,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let job = jobs::get(pool, auth.user_id, &job_id).await?;
    Ok(Json(json!({ "job": job })))
}

/// PATCH /api/jobs/:job_id
pub async fn update(
    Extension(auth): Extension<AuthUser>,
    Path(job_id): Path<String>,
    Json(body): Json<jobs::UpdateJob>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let job = jobs::update(pool, auth.user_id, &job_id, body).await?;
    Ok(Json(json!({ "job": job })))
}

/// DELETE /api/jobs/:job_id
pub async fn delete(
    Extension(auth): Extension<AuthUser>,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    jobs::delete(pool, auth.user_id, &job_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
