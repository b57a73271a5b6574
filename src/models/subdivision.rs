use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Subdivision {
    pub subdivision_id: i64,
    pub plot_id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub type_: String,
    pub description: Option<String>,
    pub area: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SubdivisionListRow {
    pub subdivision_id: i64,
    pub plot_id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub type_: String,
    pub description: Option<String>,
    pub area: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub crop_count: i64,
    pub issue_count: i64,
}
