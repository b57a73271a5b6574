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
use crate::services::issues;

/// GET /api/issues/plots/:plot_id
pub async fn list_of_plot(
    Extension(auth): Extension<AuthUser>,
    Path(plot_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let (rows, count) = issues::list_of_plot(pool, auth.user_id, &plot_id, &params).await?;
    Ok(Json(json!({ "issues": rows, "count": count })))
}

/// GET /api/issues/subdivisions/:subdivision_id
pub async fn list_of_subdivision(
    Extension(auth): Extension<AuthUser>,
    Path(subdivision_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let (rows, count) =
        issues::list_of_subdivision(pool, auth.user_id, &subdivision_id, &params).await?;
    Ok(Json(json!({ "issues": rows, "count": count })))
}

/// POST /api/issues/plots/:plot_id
pub async fn create_in_plot(
    Extension(auth): Extension<AuthUser>,
    Path(plot_id): Path<String>,
    Json(body): Json<issues::NewIssue>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let issue = issues::create_in_plot(pool, auth.user_id, &plot_id, body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "issue": issue }))))
}

/// POST /api/issues/subdivisions/:subdivision_id
pub async fn create_in_subdivision(
    Extension(auth): Extension<AuthUser>,
    Path(subdivision_id): Path<String>,
    Json(body): Json<issues::NewIssue>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let issue = issues::create_in_subdivision(pool, auth.user_id, &subdivision_id, body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "issue": issue }))))
}

/// GET /api/issues/:issue_id
pub async fn get(
    Extension(auth): Extension<AuthUser>,
    Path(issue_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let issue = issues::get(pool, auth.user_id, &issue_id).await?;
    Ok(Json(json!({ "issue": issue })))
}

/// PATCH /api/issues/:issue_id
pub async fn update(
    Extension(auth): Extension<AuthUser>,
    Path(issue_id): Path<String>,
    Json(body): Json<issues::UpdateIssue>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let issue = issues::update(pool, auth.user_id, &issue_id, body).await?;
    Ok(Json(json!({ "issue": issue })))
}

/// DELETE /api/issues/:issue_id
pub async fn delete(
    Extension(auth): Extension<AuthUser>,
    Path(issue_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    issues::delete(pool, auth.user_id, &issue_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/issues/:issue_id/resolve
pub async fn resolve(
    Extension(auth): Extension<AuthUser>,
    Path(issue_id): Path<String>,
    Json(body): Json<issues::ResolveIssue>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let issue = issues::resolve(pool, auth.user_id, &issue_id, body).await?;
    Ok(Json(json!({ "issue": issue })))
}

/// PATCH /api/issues/:issue_id/unresolve
pub async fn unresolve(
    Extension(auth): Extension<AuthUser>,
    Path(issue_id): Path<String>,
    Json(body): Json<issues::ResolveIssue>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let issue = issues::unresolve(pool, auth.user_id, &issue_id, body).await?;
    Ok(Json(json!({ "issue": issue })))
}
