use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::{generate_jwt, Claims};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::User;
use crate::services::{conflicts, domains};
use crate::verify;

#[derive(Debug, Deserialize)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub unit_system: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub unit_system: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePassword {
    pub old_password: String,
    pub new_password: String,
}

pub async fn register(pool: &PgPool, new_user: RegisterUser) -> Result<User, ApiError> {
    verify::password_format(&new_user.password)?;
    conflicts::username(pool, &new_user.username).await?;
    conflicts::email(pool, &new_user.email).await?;

    let unit_system = match new_user.unit_system.as_deref() {
        Some(v) => domains::unit_system(v)?,
        None => "metric",
    };
    let password_hash = bcrypt::hash(&new_user.password, bcrypt::DEFAULT_COST)?;

    let user: User = sqlx::query_as(
        "INSERT INTO users (username, email, password_hash, first_name, last_name, unit_system) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(&password_hash)
    .bind(&new_user.first_name)
    .bind(&new_user.last_name)
    .bind(unit_system)
    .fetch_one(pool)
    .await?;
    Ok(user)
}

/// Authenticate by username or email, returning a bearer token and the user
pub async fn login(pool: &PgPool, request: LoginRequest) -> Result<(String, User), ApiError> {
    let user = if let Some(username) = request.username.as_deref() {
        let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await?;
        row.ok_or_else(|| ApiError::not_found("Username not found"))?
    } else if let Some(email) = request.email.as_deref() {
        let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;
        row.ok_or_else(|| ApiError::not_found("Email not found"))?
    } else {
        return Err(ApiError::bad_request("Username or email required"));
    };

    if !bcrypt::verify(&request.password, &user.password_hash)? {
        return Err(ApiError::unauthorized("Incorrect password"));
    }

    let token = generate_jwt(Claims::new(user.user_id, user.username.clone()))?;
    Ok((token, user))
}

async fn fetch(pool: &PgPool, username: &str) -> Result<User, ApiError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    user.ok_or_else(|| ApiError::not_found("User not found"))
}

/// Global user listing, restricted to admins
pub async fn list(pool: &PgPool, auth: &AuthUser) -> Result<Vec<User>, ApiError> {
    let caller = fetch(pool, &auth.username).await?;
    if !caller.is_admin() {
        return Err(ApiError::forbidden("Admin access required"));
    }

    let users: Vec<User> = sqlx::query_as("SELECT * FROM users ORDER BY user_id ASC")
        .fetch_all(pool)
        .await?;
    Ok(users)
}

pub async fn get(pool: &PgPool, auth: &AuthUser, username: &str) -> Result<User, ApiError> {
    let user = fetch(pool, username).await?;
    verify::permission(auth.username.as_str(), username, "Access denied")?;
    Ok(user)
}

pub async fn update(
    pool: &PgPool,
    auth: &AuthUser,
    username: &str,
    changes: UpdateUser,
) -> Result<User, ApiError> {
    let current = fetch(pool, username).await?;
    verify::permission(auth.username.as_str(), username, "Access denied")?;

    // Only check the email conflict when the email actually changes
    let email = changes.email.unwrap_or_else(|| current.email.clone());
    if email != current.email {
        conflicts::email(pool, &email).await?;
    }

    let unit_system = match changes.unit_system {
        Some(v) => domains::unit_system(&v)?.to_string(),
        None => current.unit_system,
    };
    let first_name = changes.first_name.unwrap_or(current.first_name);
    let last_name = changes.last_name.unwrap_or(current.last_name);

    let user: User = sqlx::query_as(
        "UPDATE users SET email = $1, first_name = $2, last_name = $3, unit_system = $4 \
         WHERE username = $5 RETURNING *",
    )
    .bind(&email)
    .bind(&first_name)
    .bind(&last_name)
    .bind(&unit_system)
    .bind(username)
    .fetch_one(pool)
    .await?;
    Ok(user)
}

pub async fn change_password(
    pool: &PgPool,
    auth: &AuthUser,
    username: &str,
    request: ChangePassword,
) -> Result<(), ApiError> {
    let current = fetch(pool, username).await?;
    verify::permission(auth.username.as_str(), username, "Access denied")?;

    if !bcrypt::verify(&request.old_password, &current.password_hash)? {
        return Err(ApiError::unauthorized("Incorrect password"));
    }
    verify::password_format(&request.new_password)?;

    let password_hash = bcrypt::hash(&request.new_password, bcrypt::DEFAULT_COST)?;
    sqlx::query("UPDATE users SET password_hash = $1 WHERE username = $2")
        .bind(&password_hash)
        .bind(username)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete the account; owned plots and their children go with it through
/// the foreign-key cascade
pub async fn delete(pool: &PgPool, auth: &AuthUser, username: &str) -> Result<(), ApiError> {
    fetch(pool, username).await?;
    verify::permission(auth.username.as_str(), username, "Access denied")?;

    sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(username)
        .execute(pool)
        .await?;
    Ok(())
}
