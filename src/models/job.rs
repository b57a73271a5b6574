use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Job {
    pub job_id: i64,
    pub plot_id: i64,
    pub subdivision_id: Option<i64>,
    pub crop_id: Option<i64>,
    pub issue_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub is_done: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobListRow {
    pub job_id: i64,
    pub plot_id: i64,
    pub subdivision_id: Option<i64>,
    pub crop_id: Option<i64>,
    pub issue_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub is_done: bool,
    pub created_at: DateTime<Utc>,
    pub subdivision_name: Option<String>,
}
