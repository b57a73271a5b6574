use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Issue {
    pub issue_id: i64,
    pub plot_id: i64,
    pub subdivision_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub is_critical: bool,
    pub is_resolved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct IssueListRow {
    pub issue_id: i64,
    pub plot_id: i64,
    pub subdivision_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub is_critical: bool,
    pub is_resolved: bool,
    pub created_at: DateTime<Utc>,
    pub subdivision_name: Option<String>,
}
