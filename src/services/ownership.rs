//! Ownership-chain resolution.
//!
//! Parent relationships form a small DAG: crops, issues and jobs hang off a
//! plot (optionally via a subdivision), subdivisions hang off a plot, and a
//! plot belongs to a user. `resolve_owner` walks the chain one hop per
//! query, failing with the 404 message of the first missing node; a broken
//! plot reference reached through a subdivision still reports "Plot not
//! found".

use sqlx::PgPool;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Plot(i64),
    Subdivision(i64),
    Crop(i64),
    Issue(i64),
    Job(i64),
}

/// Resolve the user that ultimately owns `node`
pub async fn resolve_owner(pool: &PgPool, node: Node) -> Result<i64, ApiError> {
    let mut current = node;
    loop {
        current = match current {
            Node::Plot(id) => return plot_owner_id(pool, id).await,
            Node::Subdivision(id) => Node::Plot(subdivision_plot_id(pool, id).await?),
            Node::Crop(id) => Node::Plot(crop_plot_id(pool, id).await?),
            Node::Issue(id) => Node::Plot(issue_plot_id(pool, id).await?),
            Node::Job(id) => Node::Plot(job_plot_id(pool, id).await?),
        };
    }
}

pub async fn plot_owner_id(pool: &PgPool, plot_id: i64) -> Result<i64, ApiError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT owner_id FROM plots WHERE plot_id = $1")
        .bind(plot_id)
        .fetch_optional(pool)
        .await?;
    row.map(|r| r.0)
        .ok_or_else(|| ApiError::not_found("Plot not found"))
}

pub async fn subdivision_plot_id(pool: &PgPool, subdivision_id: i64) -> Result<i64, ApiError> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT plot_id FROM subdivisions WHERE subdivision_id = $1")
            .bind(subdivision_id)
            .fetch_optional(pool)
            .await?;
    row.map(|r| r.0)
        .ok_or_else(|| ApiError::not_found("Subdivision not found"))
}

pub async fn crop_plot_id(pool: &PgPool, crop_id: i64) -> Result<i64, ApiError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT plot_id FROM crops WHERE crop_id = $1")
        .bind(crop_id)
        .fetch_optional(pool)
        .await?;
    row.map(|r| r.0)
        .ok_or_else(|| ApiError::not_found("Crop not found"))
}

pub async fn issue_plot_id(pool: &PgPool, issue_id: i64) -> Result<i64, ApiError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT plot_id FROM issues WHERE issue_id = $1")
        .bind(issue_id)
        .fetch_optional(pool)
        .await?;
    row.map(|r| r.0)
        .ok_or_else(|| ApiError::not_found("Issue not found"))
}

pub async fn job_plot_id(pool: &PgPool, job_id: i64) -> Result<i64, ApiError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT plot_id FROM jobs WHERE job_id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await?;
    row.map(|r| r.0)
        .ok_or_else(|| ApiError::not_found("Job not found"))
}

/// Ensure a user row exists, for list endpoints keyed by owner id
pub async fn user_exists(pool: &PgPool, user_id: i64) -> Result<(), ApiError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT user_id FROM users WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    row.map(|_| ())
        .ok_or_else(|| ApiError::not_found("User not found"))
}
