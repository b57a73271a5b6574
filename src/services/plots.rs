use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::config;
use crate::error::ApiError;
use crate::models::{Plot, PlotListRow};
use crate::query::{ListParams, Pagination, SelectQuery, SortSpec};
use crate::services::{conflicts, domains, ownership};
use crate::verify;

const SORT: SortSpec = SortSpec {
    columns: &["plot_id", "name", "type", "area", "is_pinned"],
    nullable: &["area"],
    default: "plot_id",
    display_key: "name",
};

const LIST_SELECT: &str = "SELECT p.plot_id, p.owner_id, p.name, p.type, p.description, \
     p.location, p.area, p.is_pinned, p.created_at, \
     COUNT(DISTINCT s.subdivision_id) AS subdivision_count, \
     COUNT(DISTINCT c.crop_id) AS crop_count, \
     COUNT(DISTINCT i.issue_id) AS issue_count \
     FROM plots p \
     LEFT JOIN subdivisions s ON s.plot_id = p.plot_id \
     LEFT JOIN crops c ON c.plot_id = p.plot_id \
     LEFT JOIN issues i ON i.plot_id = p.plot_id";

#[derive(Debug, Deserialize)]
pub struct NewPlot {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub area: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlot {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub area: Option<f64>,
}

/// Plots of one owner, filtered/sorted/paginated, with child counts
pub async fn list(
    pool: &PgPool,
    auth_user_id: i64,
    owner_id: &str,
    params: &ListParams,
) -> Result<(Vec<PlotListRow>, i64), ApiError> {
    let owner_id = verify::positive_int(owner_id)?;
    let pagination = Pagination::from_params(params)?;

    ownership::user_exists(pool, owner_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    let (sort, direction) = SORT.resolve(params)?;

    let mut q = SelectQuery::new(LIST_SELECT);
    q.and_eq("p.owner_id", json!(owner_id));
    if let Some(name) = params.name.as_deref() {
        q.and_contains("p.name", name);
    }
    if let Some(t) = params.type_.as_deref() {
        let canonical = domains::plot_type(t)?;
        q.and_eq_fold_case("p.type", canonical);
    }
    if SORT.is_nullable(sort) {
        q.and_not_null(&format!("p.{}", sort));
    }
    q.group_by("p.plot_id");
    let tie_break = SORT.tie_break(sort).map(|t| format!("p.{}", t));
    q.order_by(&format!("p.{}", sort), direction, tie_break.as_deref());
    q.paginate(pagination.limit, pagination.page);

    let rows: Vec<PlotListRow> = q.fetch_all(pool).await?;
    verify::pagination(pagination.page, rows.len())?;

    let count = q.fetch_count("plots p", pool).await?;
    Ok((rows, count))
}

async fn fetch(pool: &PgPool, plot_id: i64) -> Result<Plot, ApiError> {
    let plot: Option<Plot> = sqlx::query_as("SELECT * FROM plots WHERE plot_id = $1")
        .bind(plot_id)
        .fetch_optional(pool)
        .await?;
    plot.ok_or_else(|| ApiError::not_found("Plot not found"))
}

pub async fn get(pool: &PgPool, auth_user_id: i64, plot_id: &str) -> Result<Plot, ApiError> {
    let plot_id = verify::positive_int(plot_id)?;
    let plot = fetch(pool, plot_id).await?;
    verify::permission(&auth_user_id, &plot.owner_id, "Access denied")?;
    Ok(plot)
}

pub async fn create(
    pool: &PgPool,
    auth_user_id: i64,
    owner_id: &str,
    new_plot: NewPlot,
) -> Result<Plot, ApiError> {
    let owner_id = verify::positive_int(owner_id)?;
    ownership::user_exists(pool, owner_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    let plot_type = domains::plot_type(&new_plot.type_)?;
    conflicts::plot_name(pool, owner_id, &new_plot.name).await?;

    let plot: Plot = sqlx::query_as(
        "INSERT INTO plots (owner_id, name, type, description, location, area) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(owner_id)
    .bind(&new_plot.name)
    .bind(plot_type)
    .bind(&new_plot.description)
    .bind(&new_plot.location)
    .bind(new_plot.area)
    .fetch_one(pool)
    .await?;
    Ok(plot)
}

pub async fn update(
    pool: &PgPool,
    auth_user_id: i64,
    plot_id: &str,
    changes: UpdatePlot,
) -> Result<Plot, ApiError> {
    let plot_id = verify::positive_int(plot_id)?;
    let current = fetch(pool, plot_id).await?;
    verify::permission(&auth_user_id, &current.owner_id, "Access denied")?;

    // Only check the name conflict when the name actually changes
    let name = changes.name.unwrap_or_else(|| current.name.clone());
    if name != current.name {
        conflicts::plot_name(pool, current.owner_id, &name).await?;
    }

    let plot_type = match changes.type_ {
        Some(t) => domains::plot_type(&t)?.to_string(),
        None => current.type_,
    };
    let description = changes.description.or(current.description);
    let location = changes.location.or(current.location);
    let area = changes.area.or(current.area);

    let plot: Plot = sqlx::query_as(
        "UPDATE plots SET name = $1, type = $2, description = $3, location = $4, area = $5 \
         WHERE plot_id = $6 RETURNING *",
    )
    .bind(&name)
    .bind(&plot_type)
    .bind(&description)
    .bind(&location)
    .bind(area)
    .bind(plot_id)
    .fetch_one(pool)
    .await?;
    Ok(plot)
}

pub async fn delete(pool: &PgPool, auth_user_id: i64, plot_id: &str) -> Result<(), ApiError> {
    let plot_id = verify::positive_int(plot_id)?;
    let owner_id = ownership::plot_owner_id(pool, plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    sqlx::query("DELETE FROM plots WHERE plot_id = $1")
        .bind(plot_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Pin endpoint accepts only `isPinned: true`. The pin-limit count is a
/// read-then-write check; concurrent pins race at the database's default
/// isolation level.
pub async fn pin(
    pool: &PgPool,
    auth_user_id: i64,
    plot_id: &str,
    is_pinned: bool,
) -> Result<Plot, ApiError> {
    let plot_id = verify::positive_int(plot_id)?;
    let plot = fetch(pool, plot_id).await?;
    verify::permission(&auth_user_id, &plot.owner_id, "Access denied")?;
    verify::boolean_value(is_pinned, true)?;

    let (pinned_count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM plots WHERE owner_id = $1 AND is_pinned = TRUE")
            .bind(plot.owner_id)
            .fetch_one(pool)
            .await?;

    if plot.is_pinned || pinned_count >= config::config().security.pin_limit {
        return Err(ApiError::bad_request(
            "Plot already pinned or pin limit reached",
        ));
    }

    let plot: Plot =
        sqlx::query_as("UPDATE plots SET is_pinned = TRUE WHERE plot_id = $1 RETURNING *")
            .bind(plot_id)
            .fetch_one(pool)
            .await?;
    Ok(plot)
}

/// Unpin endpoint accepts only `isPinned: false`
pub async fn unpin(
    pool: &PgPool,
    auth_user_id: i64,
    plot_id: &str,
    is_pinned: bool,
) -> Result<Plot, ApiError> {
    let plot_id = verify::positive_int(plot_id)?;
    let plot = fetch(pool, plot_id).await?;
    verify::permission(&auth_user_id, &plot.owner_id, "Access denied")?;
    verify::boolean_value(is_pinned, false)?;

    if !plot.is_pinned {
        return Err(ApiError::bad_request("Plot already unpinned"));
    }

    let plot: Plot =
        sqlx::query_as("UPDATE plots SET is_pinned = FALSE WHERE plot_id = $1 RETURNING *")
            .bind(plot_id)
            .fetch_one(pool)
            .await?;
    Ok(plot)
}
