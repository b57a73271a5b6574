use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Crop {
    pub crop_id: i64,
    pub plot_id: i64,
    pub subdivision_id: Option<i64>,
    pub name: String,
    pub variety: Option<String>,
    pub category: String,
    pub quantity: Option<i32>,
    pub date_planted: Option<NaiveDate>,
    pub harvest_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// List row carrying the sibling subdivision name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CropListRow {
    pub crop_id: i64,
    pub plot_id: i64,
    pub subdivision_id: Option<i64>,
    pub name: String,
    pub variety: Option<String>,
    pub category: String,
    pub quantity: Option<i32>,
    pub date_planted: Option<NaiveDate>,
    pub harvest_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub subdivision_name: Option<String>,
}
