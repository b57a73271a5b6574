use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::{Subdivision, SubdivisionListRow};
use crate::query::{ListParams, Pagination, SelectQuery, SortSpec};
use crate::services::{conflicts, domains, ownership};
use crate::verify;

const SORT: SortSpec = SortSpec {
    columns: &["subdivision_id", "name", "type", "area"],
    nullable: &["area"],
    default: "subdivision_id",
    display_key: "name",
};

const LIST_SELECT: &str = "SELECT s.subdivision_id, s.plot_id, s.name, s.type, s.description, \
     s.area, s.created_at, \
     COUNT(DISTINCT c.crop_id) AS crop_count, \
     COUNT(DISTINCT i.issue_id) AS issue_count \
     FROM subdivisions s \
     LEFT JOIN crops c ON c.subdivision_id = s.subdivision_id \
     LEFT JOIN issues i ON i.subdivision_id = s.subdivision_id";

#[derive(Debug, Deserialize)]
pub struct NewSubdivision {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub description: Option<String>,
    pub area: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSubdivision {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub description: Option<String>,
    pub area: Option<f64>,
}

/// Subdivisions of one plot, with child counts
pub async fn list(
    pool: &PgPool,
    auth_user_id: i64,
    plot_id: &str,
    params: &ListParams,
) -> Result<(Vec<SubdivisionListRow>, i64), ApiError> {
    let plot_id = verify::positive_int(plot_id)?;
    let pagination = Pagination::from_params(params)?;

    let owner_id = ownership::plot_owner_id(pool, plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    let (sort, direction) = SORT.resolve(params)?;

    let mut q = SelectQuery::new(LIST_SELECT);
    q.and_eq("s.plot_id", json!(plot_id));
    if let Some(name) = params.name.as_deref() {
        q.and_contains("s.name", name);
    }
    if let Some(t) = params.type_.as_deref() {
        let canonical = domains::subdivision_type(t)?;
        q.and_eq_fold_case("s.type", canonical);
    }
    if SORT.is_nullable(sort) {
        q.and_not_null(&format!("s.{}", sort));
    }
    q.group_by("s.subdivision_id");
    let tie_break = SORT.tie_break(sort).map(|t| format!("s.{}", t));
    q.order_by(&format!("s.{}", sort), direction, tie_break.as_deref());
    q.paginate(pagination.limit, pagination.page);

    let rows: Vec<SubdivisionListRow> = q.fetch_all(pool).await?;
    verify::pagination(pagination.page, rows.len())?;

    let count = q.fetch_count("subdivisions s", pool).await?;
    Ok((rows, count))
}

async fn fetch(pool: &PgPool, subdivision_id: i64) -> Result<Subdivision, ApiError> {
    let row: Option<Subdivision> =
        sqlx::query_as("SELECT * FROM subdivisions WHERE subdivision_id = $1")
            .bind(subdivision_id)
            .fetch_optional(pool)
            .await?;
    row.ok_or_else(|| ApiError::not_found("Subdivision not found"))
}

pub async fn get(
    pool: &PgPool,
    auth_user_id: i64,
    subdivision_id: &str,
) -> Result<Subdivision, ApiError> {
    let subdivision_id = verify::positive_int(subdivision_id)?;
    let subdivision = fetch(pool, subdivision_id).await?;
    let owner_id = ownership::plot_owner_id(pool, subdivision.plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;
    Ok(subdivision)
}

pub async fn create(
    pool: &PgPool,
    auth_user_id: i64,
    plot_id: &str,
    new_subdivision: NewSubdivision,
) -> Result<Subdivision, ApiError> {
    let plot_id = verify::positive_int(plot_id)?;
    let owner_id = ownership::plot_owner_id(pool, plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    let subdivision_type = domains::subdivision_type(&new_subdivision.type_)?;
    conflicts::subdivision_name(pool, plot_id, &new_subdivision.name).await?;

    let subdivision: Subdivision = sqlx::query_as(
        "INSERT INTO subdivisions (plot_id, name, type, description, area) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(plot_id)
    .bind(&new_subdivision.name)
    .bind(subdivision_type)
    .bind(&new_subdivision.description)
    .bind(new_subdivision.area)
    .fetch_one(pool)
    .await?;
    Ok(subdivision)
}

pub async fn update(
    pool: &PgPool,
    auth_user_id: i64,
    subdivision_id: &str,
    changes: UpdateSubdivision,
) -> Result<Subdivision, ApiError> {
    let subdivision_id = verify::positive_int(subdivision_id)?;
    let current = fetch(pool, subdivision_id).await?;
    let owner_id = ownership::plot_owner_id(pool, current.plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    // Only check the name conflict when the name actually changes
    let name = changes.name.unwrap_or_else(|| current.name.clone());
    if name != current.name {
        conflicts::subdivision_name(pool, current.plot_id, &name).await?;
    }

    let subdivision_type = match changes.type_ {
        Some(t) => domains::subdivision_type(&t)?.to_string(),
        None => current.type_,
    };
    let description = changes.description.or(current.description);
    let area = changes.area.or(current.area);

    let subdivision: Subdivision = sqlx::query_as(
        "UPDATE subdivisions SET name = $1, type = $2, description = $3, area = $4 \
         WHERE subdivision_id = $5 RETURNING *",
    )
    .bind(&name)
    .bind(&subdivision_type)
    .bind(&description)
    .bind(area)
    .bind(subdivision_id)
    .fetch_one(pool)
    .await?;
    Ok(subdivision)
}

pub async fn delete(
    pool: &PgPool,
    auth_user_id: i64,
    subdivision_id: &str,
) -> Result<(), ApiError> {
    let subdivision_id = verify::positive_int(subdivision_id)?;
    let plot_id = ownership::subdivision_plot_id(pool, subdivision_id).await?;
    let owner_id = ownership::plot_owner_id(pool, plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    sqlx::query("DELETE FROM subdivisions WHERE subdivision_id = $1")
        .bind(subdivision_id)
        .execute(pool)
        .await?;
    Ok(())
}
