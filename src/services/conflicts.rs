//! Uniqueness checks run before insert/update. All matches are
//! case-sensitive exact. Callers updating a record compare the new name
//! against the stored one first and only invoke these when it changed.

use sqlx::PgPool;

use crate::error::ApiError;

pub async fn plot_name(pool: &PgPool, owner_id: i64, name: &str) -> Result<(), ApiError> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM plots WHERE owner_id = $1 AND name = $2)",
    )
    .bind(owner_id)
    .bind(name)
    .fetch_one(pool)
    .await?;

    if exists {
        Err(ApiError::conflict("Plot name already exists"))
    } else {
        Ok(())
    }
}

pub async fn subdivision_name(pool: &PgPool, plot_id: i64, name: &str) -> Result<(), ApiError> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM subdivisions WHERE plot_id = $1 AND name = $2)",
    )
    .bind(plot_id)
    .bind(name)
    .fetch_one(pool)
    .await?;

    if exists {
        Err(ApiError::conflict("Subdivision name already exists"))
    } else {
        Ok(())
    }
}

pub async fn username(pool: &PgPool, username: &str) -> Result<(), ApiError> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(pool)
            .await?;

    if exists {
        Err(ApiError::conflict("Username already exists"))
    } else {
        Ok(())
    }
}

pub async fn email(pool: &PgPool, email: &str) -> Result<(), ApiError> {
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await?;

    if exists {
        Err(ApiError::conflict("Email already exists"))
    } else {
        Ok(())
    }
}
