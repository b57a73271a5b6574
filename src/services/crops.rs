use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::{Crop, CropListRow};
use crate::query::{ListParams, Pagination, SelectQuery, SortSpec};
use crate::services::{domains, ownership};
use crate::services::ownership::Node;
use crate::verify;

const SORT: SortSpec = SortSpec {
    columns: &[
        "crop_id",
        "name",
        "category",
        "quantity",
        "date_planted",
        "harvest_date",
    ],
    nullable: &["quantity", "date_planted", "harvest_date"],
    default: "crop_id",
    display_key: "name",
};

const LIST_SELECT: &str = "SELECT c.crop_id, c.plot_id, c.subdivision_id, c.name, c.variety, \
     c.category, c.quantity, c.date_planted, c.harvest_date, c.created_at, \
     s.name AS subdivision_name \
     FROM crops c \
     LEFT JOIN subdivisions s ON s.subdivision_id = c.subdivision_id";

#[derive(Debug, Deserialize)]
pub struct NewCrop {
    pub name: String,
    pub variety: Option<String>,
    pub category: String,
    pub quantity: Option<i32>,
    pub date_planted: Option<NaiveDate>,
    pub harvest_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCrop {
    pub name: Option<String>,
    pub variety: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
    pub date_planted: Option<NaiveDate>,
    pub harvest_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct MoveCropToPlot {
    pub plot_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct MoveCropToSubdivision {
    pub subdivision_id: Option<i64>,
}

enum CropParent {
    Plot(i64),
    Subdivision(i64),
}

async fn list_of(
    pool: &PgPool,
    auth_user_id: i64,
    parent: CropParent,
    params: &ListParams,
) -> Result<(Vec<CropListRow>, i64), ApiError> {
    let pagination = Pagination::from_params(params)?;

    let (parent_column, parent_id) = match parent {
        CropParent::Plot(id) => {
            let owner_id = ownership::plot_owner_id(pool, id).await?;
            verify::permission(&auth_user_id, &owner_id, "Access denied")?;
            ("c.plot_id", id)
        }
        CropParent::Subdivision(id) => {
            let owner_id = ownership::resolve_owner(pool, Node::Subdivision(id)).await?;
            verify::permission(&auth_user_id, &owner_id, "Access denied")?;
            ("c.subdivision_id", id)
        }
    };

    let (sort, direction) = SORT.resolve(params)?;

    let mut q = SelectQuery::new(LIST_SELECT);
    q.and_eq(parent_column, json!(parent_id));
    if let Some(name) = params.name.as_deref() {
        q.and_contains("c.name", name);
    }
    if let Some(category) = params.category.as_deref() {
        let canonical = domains::crop_category(category)?;
        q.and_eq_fold_case("c.category", canonical);
    }
    if SORT.is_nullable(sort) {
        q.and_not_null(&format!("c.{}", sort));
    }
    let tie_break = SORT.tie_break(sort).map(|t| format!("c.{}", t));
    q.order_by(&format!("c.{}", sort), direction, tie_break.as_deref());
    q.paginate(pagination.limit, pagination.page);

    let rows: Vec<CropListRow> = q.fetch_all(pool).await?;
    verify::pagination(pagination.page, rows.len())?;

    let count = q.fetch_count("crops c", pool).await?;
    Ok((rows, count))
}

/// Crops of one plot
pub async fn list_of_plot(
    pool: &PgPool,
    auth_user_id: i64,
    plot_id: &str,
    params: &ListParams,
) -> Result<(Vec<CropListRow>, i64), ApiError> {
    let plot_id = verify::positive_int(plot_id)?;
    list_of(pool, auth_user_id, CropParent::Plot(plot_id), params).await
}

/// Crops of one subdivision
pub async fn list_of_subdivision(
    pool: &PgPool,
    auth_user_id: i64,
    subdivision_id: &str,
    params: &ListParams,
) -> Result<(Vec<CropListRow>, i64), ApiError> {
    let subdivision_id = verify::positive_int(subdivision_id)?;
    list_of(
        pool,
        auth_user_id,
        CropParent::Subdivision(subdivision_id),
        params,
    )
    .await
}

async fn fetch(pool: &PgPool, crop_id: i64) -> Result<Crop, ApiError> {
    let crop: Option<Crop> = sqlx::query_as("SELECT * FROM crops WHERE crop_id = $1")
        .bind(crop_id)
        .fetch_optional(pool)
        .await?;
    crop.ok_or_else(|| ApiError::not_found("Crop not found"))
}

pub async fn get(pool: &PgPool, auth_user_id: i64, crop_id: &str) -> Result<Crop, ApiError> {
    let crop_id = verify::positive_int(crop_id)?;
    let crop = fetch(pool, crop_id).await?;
    let owner_id = ownership::plot_owner_id(pool, crop.plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;
    Ok(crop)
}

pub async fn create_in_plot(
    pool: &PgPool,
    auth_user_id: i64,
    plot_id: &str,
    new_crop: NewCrop,
) -> Result<Crop, ApiError> {
    let plot_id = verify::positive_int(plot_id)?;
    let owner_id = ownership::plot_owner_id(pool, plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    insert(pool, plot_id, None, new_crop).await
}

pub async fn create_in_subdivision(
    pool: &PgPool,
    auth_user_id: i64,
    subdivision_id: &str,
    new_crop: NewCrop,
) -> Result<Crop, ApiError> {
    let subdivision_id = verify::positive_int(subdivision_id)?;
    let plot_id = ownership::subdivision_plot_id(pool, subdivision_id).await?;
    let owner_id = ownership::plot_owner_id(pool, plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    insert(pool, plot_id, Some(subdivision_id), new_crop).await
}

async fn insert(
    pool: &PgPool,
    plot_id: i64,
    subdivision_id: Option<i64>,
    new_crop: NewCrop,
) -> Result<Crop, ApiError> {
    let category = domains::crop_category(&new_crop.category)?;

    let crop: Crop = sqlx::query_as(
        "INSERT INTO crops (plot_id, subdivision_id, name, variety, category, quantity, \
         date_planted, harvest_date) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(plot_id)
    .bind(subdivision_id)
    .bind(&new_crop.name)
    .bind(&new_crop.variety)
    .bind(category)
    .bind(new_crop.quantity)
    .bind(new_crop.date_planted)
    .bind(new_crop.harvest_date)
    .fetch_one(pool)
    .await?;
    Ok(crop)
}

pub async fn update(
    pool: &PgPool,
    auth_user_id: i64,
    crop_id: &str,
    changes: UpdateCrop,
) -> Result<Crop, ApiError> {
    let crop_id = verify::positive_int(crop_id)?;
    let current = fetch(pool, crop_id).await?;
    let owner_id = ownership::plot_owner_id(pool, current.plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    let category = match changes.category {
        Some(c) => domains::crop_category(&c)?.to_string(),
        None => current.category,
    };
    let name = changes.name.unwrap_or(current.name);
    let variety = changes.variety.or(current.variety);
    let quantity = changes.quantity.or(current.quantity);
    let date_planted = changes.date_planted.or(current.date_planted);
    let harvest_date = changes.harvest_date.or(current.harvest_date);

    let crop: Crop = sqlx::query_as(
        "UPDATE crops SET name = $1, variety = $2, category = $3, quantity = $4, \
         date_planted = $5, harvest_date = $6 WHERE crop_id = $7 RETURNING *",
    )
    .bind(&name)
    .bind(&variety)
    .bind(&category)
    .bind(quantity)
    .bind(date_planted)
    .bind(harvest_date)
    .bind(crop_id)
    .fetch_one(pool)
    .await?;
    Ok(crop)
}

pub async fn delete(pool: &PgPool, auth_user_id: i64, crop_id: &str) -> Result<(), ApiError> {
    let crop_id = verify::positive_int(crop_id)?;
    let owner_id = ownership::resolve_owner(pool, Node::Crop(crop_id)).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    sqlx::query("DELETE FROM crops WHERE crop_id = $1")
        .bind(crop_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Move a crop to another plot. The subdivision assignment is cleared; a
/// crop cannot keep a subdivision reference from its old plot.
pub async fn set_plot(
    pool: &PgPool,
    auth_user_id: i64,
    crop_id: &str,
    body: MoveCropToPlot,
) -> Result<Crop, ApiError> {
    let crop_id = verify::positive_int(crop_id)?;
    let target_plot_id = verify::positive(body.plot_id)?;

    let crop = fetch(pool, crop_id).await?;
    let owner_id = ownership::plot_owner_id(pool, crop.plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    // Destination ownership is re-verified independently of the source
    let target_owner_id = ownership::plot_owner_id(pool, target_plot_id).await?;
    verify::permission(&auth_user_id, &target_owner_id, "Access denied")?;

    let crop: Crop = sqlx::query_as(
        "UPDATE crops SET plot_id = $1, subdivision_id = NULL WHERE crop_id = $2 RETURNING *",
    )
    .bind(target_plot_id)
    .bind(crop_id)
    .fetch_one(pool)
    .await?;
    Ok(crop)
}

/// Assign a crop to a subdivision of its current plot, or clear the
/// assignment with `subdivision_id: null`
pub async fn set_subdivision(
    pool: &PgPool,
    auth_user_id: i64,
    crop_id: &str,
    body: MoveCropToSubdivision,
) -> Result<Crop, ApiError> {
    let crop_id = verify::positive_int(crop_id)?;

    let crop = fetch(pool, crop_id).await?;
    let owner_id = ownership::plot_owner_id(pool, crop.plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    if let Some(subdivision_id) = body.subdivision_id {
        let subdivision_id = verify::positive(subdivision_id)?;
        let target_plot_id = ownership::subdivision_plot_id(pool, subdivision_id).await?;
        let target_owner_id = ownership::plot_owner_id(pool, target_plot_id).await?;
        verify::permission(&auth_user_id, &target_owner_id, "Access denied")?;

        if target_plot_id != crop.plot_id {
            return Err(ApiError::bad_request("Invalid subdivision of current plot"));
        }
    }

    let crop: Crop =
        sqlx::query_as("UPDATE crops SET subdivision_id = $1 WHERE crop_id = $2 RETURNING *")
            .bind(body.subdivision_id)
            .bind(crop_id)
            .fetch_one(pool)
            .await?;
    Ok(crop)
}
