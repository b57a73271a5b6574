use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::{Job, JobListRow};
use crate::query::{ListParams, Pagination, SelectQuery, SortSpec};
use crate::services::ownership;
use crate::services::ownership::Node;
use crate::verify;

const SORT: SortSpec = SortSpec {
    columns: &["job_id", "title", "due_date", "is_done"],
    nullable: &["due_date"],
    default: "job_id",
    display_key: "title",
};

const LIST_SELECT: &str = "SELECT j.job_id, j.plot_id, j.subdivision_id, j.crop_id, j.issue_id, \
     j.title, j.description, j.due_date, j.is_done, j.created_at, \
     s.name AS subdivision_name \
     FROM jobs j \
     LEFT JOIN subdivisions s ON s.subdivision_id = j.subdivision_id";

#[derive(Debug, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub description: Option<String>,
    pub subdivision_id: Option<i64>,
    pub crop_id: Option<i64>,
    pub issue_id: Option<i64>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateJob {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub is_done: Option<bool>,
}

/// Jobs of one plot
pub async fn list_of_plot(
    pool: &PgPool,
    auth_user_id: i64,
    plot_id: &str,
    params: &ListParams,
) -> Result<(Vec<JobListRow>, i64), ApiError> {
    let plot_id = verify::positive_int(plot_id)?;
    let pagination = Pagination::from_params(params)?;

    let owner_id = ownership::plot_owner_id(pool, plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    let (sort, direction) = SORT.resolve(params)?;

    let mut q = SelectQuery::new(LIST_SELECT);
    q.and_eq("j.plot_id", json!(plot_id));
    if let Some(title) = params.title.as_deref() {
        q.and_contains("j.title", title);
    }
    if let Some(v) = params.is_done.as_deref() {
        verify::query_value(&["true", "false"], v)?;
        q.and_eq("j.is_done", json!(v == "true"));
    }
    if SORT.is_nullable(sort) {
        q.and_not_null(&format!("j.{}", sort));
    }
    let tie_break = SORT.tie_break(sort).map(|t| format!("j.{}", t));
    q.order_by(&format!("j.{}", sort), direction, tie_break.as_deref());
    q.paginate(pagination.limit, pagination.page);

    let rows: Vec<JobListRow> = q.fetch_all(pool).await?;
    verify::pagination(pagination.page, rows.len())?;

    let count = q.fetch_count("jobs j", pool).await?;
    Ok((rows, count))
}

async fn fetch(pool: &PgPool, job_id: i64) -> Result<Job, ApiError> {
    let job: Option<Job> = sqlx::query_as("SELECT * FROM jobs WHERE job_id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await?;
    job.ok_or_else(|| ApiError::not_found("Job not found"))
}

pub async fn get(pool: &PgPool, auth_user_id: i64, job_id: &str) -> Result<Job, ApiError> {
    let job_id = verify::positive_int(job_id)?;
    let job = fetch(pool, job_id).await?;
    let owner_id = ownership::plot_owner_id(pool, job.plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;
    Ok(job)
}

pub async fn create_in_plot(
    pool: &PgPool,
    auth_user_id: i64,
    plot_id: &str,
    new_job: NewJob,
) -> Result<Job, ApiError> {
    let plot_id = verify::positive_int(plot_id)?;
    let owner_id = ownership::plot_owner_id(pool, plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    // Linked records must sit under the same plot the job belongs to
    if let Some(subdivision_id) = new_job.subdivision_id {
        let subdivision_id = verify::positive(subdivision_id)?;
        let subdivision_plot = ownership::subdivision_plot_id(pool, subdivision_id).await?;
        if subdivision_plot != plot_id {
            return Err(ApiError::bad_request("Invalid subdivision of current plot"));
        }
    }
    if let Some(crop_id) = new_job.crop_id {
        let crop_id = verify::positive(crop_id)?;
        let crop_plot = ownership::crop_plot_id(pool, crop_id).await?;
        if crop_plot != plot_id {
            return Err(ApiError::bad_request("Invalid crop of current plot"));
        }
    }
    if let Some(issue_id) = new_job.issue_id {
        let issue_id = verify::positive(issue_id)?;
        let issue_plot = ownership::issue_plot_id(pool, issue_id).await?;
        if issue_plot != plot_id {
            return Err(ApiError::bad_request("Invalid issue of current plot"));
        }
    }

    let job: Job = sqlx::query_as(
        "INSERT INTO jobs (plot_id, subdivision_id, crop_id, issue_id, title, description, \
         due_date) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(plot_id)
    .bind(new_job.subdivision_id)
    .bind(new_job.crop_id)
    .bind(new_job.issue_id)
    .bind(&new_job.title)
    .bind(&new_job.description)
    .bind(new_job.due_date)
    .fetch_one(pool)
    .await?;
    Ok(job)
}

pub async fn update(
    pool: &PgPool,
    auth_user_id: i64,
    job_id: &str,
    changes: UpdateJob,
) -> Result<Job, ApiError> {
    let job_id = verify::positive_int(job_id)?;
    let current = fetch(pool, job_id).await?;
    let owner_id = ownership::plot_owner_id(pool, current.plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    let title = changes.title.unwrap_or(current.title);
    let description = changes.description.or(current.description);
    let due_date = changes.due_date.or(current.due_date);
    let is_done = changes.is_done.unwrap_or(current.is_done);

    let job: Job = sqlx::query_as(
        "UPDATE jobs SET title = $1, description = $2, due_date = $3, is_done = $4 \
         WHERE job_id = $5 RETURNING *",
    )
    .bind(&title)
    .bind(&description)
    .bind(due_date)
    .bind(is_done)
    .bind(job_id)
    .fetch_one(pool)
    .await?;
    Ok(job)
}

pub async fn delete(pool: &PgPool, auth_user_id: i64, job_id: &str) -> Result<(), ApiError> {
    let job_id = verify::positive_int(job_id)?;
    let owner_id = ownership::resolve_owner(pool, Node::Job(job_id)).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    sqlx::query("DELETE FROM jobs WHERE job_id = $1")
        .bind(job_id)
        .execute(pool)
        .await?;
    Ok(())
}
