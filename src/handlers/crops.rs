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
use crate::services::crops;

/// GET /api/crops/plots/:plot_id
pub async fn list_of_plot(
    Extension(auth): Extension<AuthUser>,
    Path(plot_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let (rows, count) = crops::list_of_plot(pool, auth.user_id, &plot_id, &params).await?;
    Ok(Json(json!({ "crops": rows, "count": count })))
}

/// GET /api/crops/subdivisions/:subdivision_id
pub async fn list_of_subdivision(
    Extension(auth): Extension<AuthUser>,
    Path(subdivision_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let (rows, count) =
        crops::list_of_subdivision(pool, auth.user_id, &subdivision_id, &params).await?;
    Ok(Json(json!({ "crops": rows, "count": count })))
}

/// POST /api/crops/plots/:plot_id
pub async fn create_in_plot(
    Extension(auth): Extension<AuthUser>,
    Path(plot_id): Path<String>,
    Json(body): Json<crops::NewCrop>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let crop = crops::create_in_plot(pool, auth.user_id, &plot_id, body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "crop": crop }))))
}

/// POST /api/crops/subdivisions/:subdivision_id
pub async fn create_in_subdivision(
    Extension(auth): Extension<AuthUser>,
    Path(subdivision_id): Path<String>,
    Json(body): Json<crops::NewCrop>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let crop = crops::create_in_subdivision(pool, auth.user_id, &subdivision_id, body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "crop": crop }))))
}

/// GET /api/crops/:crop_id
pub async fn get(
    Extension(auth): Extension<AuthUser>,
    Path(crop_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let crop = crops::get(pool, auth.user_id, &crop_id).await?;
    Ok(Json(json!({ "crop": crop })))
}

/// PATCH /api/crops/:crop_id
pub async fn update(
    Extension(auth): Extension<AuthUser>,
    Path(crop_id): Path<String>,
    Json(body): Json<crops::UpdateCrop>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let crop = crops::update(pool, auth.user_id, &crop_id, body).await?;
    Ok(Json(json!({ "crop": crop })))
}

/// DELETE /api/crops/:crop_id
pub async fn delete(
    Extension(auth): Extension<AuthUser>,
    Path(crop_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    crops::delete(pool, auth.user_id, &crop_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/crops/:crop_id/plot
pub async fn set_plot(
    Extension(auth): Extension<AuthUser>,
    Path(crop_id): Path<String>,
    Json(body): Json<crops::MoveCropToPlot>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let crop = crops::set_plot(pool, auth.user_id, &crop_id, body).await?;
    Ok(Json(json!({ "crop": crop })))
}

/// PATCH /api/crops/:crop_id/subdivision
pub async fn set_subdivision(
    Extension(auth): Extension<AuthUser>,
    Path(crop_id): Path<String>,
    Json(body): Json<crops::MoveCropToSubdivision>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = database::pool().await?;
    let crop = crops::set_subdivision(pool, auth.user_id, &crop_id, body).await?;
    Ok(Json(json!({ "crop": crop })))
}
