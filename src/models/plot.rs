use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Plot {
    pub plot_id: i64,
    pub owner_id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub type_: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub area: Option<f64>,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
}

/// List row with child counts computed via LEFT JOINs
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PlotListRow {
    pub plot_id: i64,
    pub owner_id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub type_: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub area: Option<f64>,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
    pub subdivision_count: i64,
    pub crop_count: i64,
    pub issue_count: i64,
}
