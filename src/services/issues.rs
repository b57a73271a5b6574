use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::{Issue, IssueListRow};
use crate::query::{ListParams, Pagination, SelectQuery, SortSpec};
use crate::services::ownership;
use crate::services::ownership::Node;
use crate::verify;

const SORT: SortSpec = SortSpec {
    columns: &["issue_id", "title", "is_critical", "is_resolved"],
    nullable: &[],
    default: "issue_id",
    display_key: "title",
};

const LIST_SELECT: &str = "SELECT i.issue_id, i.plot_id, i.subdivision_id, i.title, \
     i.description, i.is_critical, i.is_resolved, i.created_at, \
     s.name AS subdivision_name \
     FROM issues i \
     LEFT JOIN subdivisions s ON s.subdivision_id = i.subdivision_id";

#[derive(Debug, Deserialize)]
pub struct NewIssue {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_critical: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateIssue {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_critical: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveIssue {
    #[serde(rename = "isResolved")]
    pub is_resolved: bool,
}

enum IssueParent {
    Plot(i64),
    Subdivision(i64),
}

async fn list_of(
    pool: &PgPool,
    auth_user_id: i64,
    parent: IssueParent,
    params: &ListParams,
) -> Result<(Vec<IssueListRow>, i64), ApiError> {
    let pagination = Pagination::from_params(params)?;

    let (parent_column, parent_id) = match parent {
        IssueParent::Plot(id) => {
            let owner_id = ownership::plot_owner_id(pool, id).await?;
            verify::permission(&auth_user_id, &owner_id, "Access denied")?;
            ("i.plot_id", id)
        }
        IssueParent::Subdivision(id) => {
            let owner_id = ownership::resolve_owner(pool, Node::Subdivision(id)).await?;
            verify::permission(&auth_user_id, &owner_id, "Access denied")?;
            ("i.subdivision_id", id)
        }
    };

    let (sort, direction) = SORT.resolve(params)?;

    let mut q = SelectQuery::new(LIST_SELECT);
    q.and_eq(parent_column, json!(parent_id));
    if let Some(title) = params.title.as_deref() {
        q.and_contains("i.title", title);
    }
    if let Some(v) = params.is_critical.as_deref() {
        verify::query_value(&["true", "false"], v)?;
        q.and_eq("i.is_critical", json!(v == "true"));
    }
    if let Some(v) = params.is_resolved.as_deref() {
        verify::query_value(&["true", "false"], v)?;
        q.and_eq("i.is_resolved", json!(v == "true"));
    }
    let tie_break = SORT.tie_break(sort).map(|t| format!("i.{}", t));
    q.order_by(&format!("i.{}", sort), direction, tie_break.as_deref());
    q.paginate(pagination.limit, pagination.page);

    let rows: Vec<IssueListRow> = q.fetch_all(pool).await?;
    verify::pagination(pagination.page, rows.len())?;

    let count = q.fetch_count("issues i", pool).await?;
    Ok((rows, count))
}

/// Issues of one plot
pub async fn list_of_plot(
    pool: &PgPool,
    auth_user_id: i64,
    plot_id: &str,
    params: &ListParams,
) -> Result<(Vec<IssueListRow>, i64), ApiError> {
    let plot_id = verify::positive_int(plot_id)?;
    list_of(pool, auth_user_id, IssueParent::Plot(plot_id), params).await
}

/// Issues of one subdivision
pub async fn list_of_subdivision(
    pool: &PgPool,
    auth_user_id: i64,
    subdivision_id: &str,
    params: &ListParams,
) -> Result<(Vec<IssueListRow>, i64), ApiError> {
    let subdivision_id = verify::positive_int(subdivision_id)?;
    list_of(
        pool,
        auth_user_id,
        IssueParent::Subdivision(subdivision_id),
        params,
    )
    .await
}

async fn fetch(pool: &PgPool, issue_id: i64) -> Result<Issue, ApiError> {
    let issue: Option<Issue> = sqlx::query_as("SELECT * FROM issues WHERE issue_id = $1")
        .bind(issue_id)
        .fetch_optional(pool)
        .await?;
    issue.ok_or_else(|| ApiError::not_found("Issue not found"))
}

pub async fn get(pool: &PgPool, auth_user_id: i64, issue_id: &str) -> Result<Issue, ApiError> {
    let issue_id = verify::positive_int(issue_id)?;
    let issue = fetch(pool, issue_id).await?;
    let owner_id = ownership::plot_owner_id(pool, issue.plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;
    Ok(issue)
}

pub async fn create_in_plot(
    pool: &PgPool,
    auth_user_id: i64,
    plot_id: &str,
    new_issue: NewIssue,
) -> Result<Issue, ApiError> {
    let plot_id = verify::positive_int(plot_id)?;
    let owner_id = ownership::plot_owner_id(pool, plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    insert(pool, plot_id, None, new_issue).await
}

pub async fn create_in_subdivision(
    pool: &PgPool,
    auth_user_id: i64,
    subdivision_id: &str,
    new_issue: NewIssue,
) -> Result<Issue, ApiError> {
    let subdivision_id = verify::positive_int(subdivision_id)?;
    let plot_id = ownership::subdivision_plot_id(pool, subdivision_id).await?;
    let owner_id = ownership::plot_owner_id(pool, plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    insert(pool, plot_id, Some(subdivision_id), new_issue).await
}

async fn insert(
    pool: &PgPool,
    plot_id: i64,
    subdivision_id: Option<i64>,
    new_issue: NewIssue,
) -> Result<Issue, ApiError> {
    let issue: Issue = sqlx::query_as(
        "INSERT INTO issues (plot_id, subdivision_id, title, description, is_critical) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(plot_id)
    .bind(subdivision_id)
    .bind(&new_issue.title)
    .bind(&new_issue.description)
    .bind(new_issue.is_critical)
    .fetch_one(pool)
    .await?;
    Ok(issue)
}

pub async fn update(
    pool: &PgPool,
    auth_user_id: i64,
    issue_id: &str,
    changes: UpdateIssue,
) -> Result<Issue, ApiError> {
    let issue_id = verify::positive_int(issue_id)?;
    let current = fetch(pool, issue_id).await?;
    let owner_id = ownership::plot_owner_id(pool, current.plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    let title = changes.title.unwrap_or(current.title);
    let description = changes.description.or(current.description);
    let is_critical = changes.is_critical.unwrap_or(current.is_critical);

    let issue: Issue = sqlx::query_as(
        "UPDATE issues SET title = $1, description = $2, is_critical = $3 \
         WHERE issue_id = $4 RETURNING *",
    )
    .bind(&title)
    .bind(&description)
    .bind(is_critical)
    .bind(issue_id)
    .fetch_one(pool)
    .await?;
    Ok(issue)
}

pub async fn delete(pool: &PgPool, auth_user_id: i64, issue_id: &str) -> Result<(), ApiError> {
    let issue_id = verify::positive_int(issue_id)?;
    let owner_id = ownership::resolve_owner(pool, Node::Issue(issue_id)).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    sqlx::query("DELETE FROM issues WHERE issue_id = $1")
        .bind(issue_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Resolve an issue. The "already resolved" business check fires before
/// the boolean-literal check on this endpoint; a resolved issue cannot
/// remain critical, so `is_critical` is cleared in the same statement.
pub async fn resolve(
    pool: &PgPool,
    auth_user_id: i64,
    issue_id: &str,
    body: ResolveIssue,
) -> Result<Issue, ApiError> {
    let issue_id = verify::positive_int(issue_id)?;
    let issue = fetch(pool, issue_id).await?;
    let owner_id = ownership::plot_owner_id(pool, issue.plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    if issue.is_resolved {
        return Err(ApiError::bad_request("Issue already resolved"));
    }
    verify::boolean_value(body.is_resolved, true)?;

    let issue: Issue = sqlx::query_as(
        "UPDATE issues SET is_resolved = TRUE, is_critical = FALSE \
         WHERE issue_id = $1 RETURNING *",
    )
    .bind(issue_id)
    .fetch_one(pool)
    .await?;
    Ok(issue)
}

/// Unresolve an issue. Here the boolean-literal check fires before the
/// "already unresolved" business check.
pub async fn unresolve(
    pool: &PgPool,
    auth_user_id: i64,
    issue_id: &str,
    body: ResolveIssue,
) -> Result<Issue, ApiError> {
    let issue_id = verify::positive_int(issue_id)?;
    let issue = fetch(pool, issue_id).await?;
    let owner_id = ownership::plot_owner_id(pool, issue.plot_id).await?;
    verify::permission(&auth_user_id, &owner_id, "Access denied")?;

    verify::boolean_value(body.is_resolved, false)?;
    if !issue.is_resolved {
        return Err(ApiError::bad_request("Issue already unresolved"));
    }

    let issue: Issue =
        sqlx::query_as("UPDATE issues SET is_resolved = FALSE WHERE issue_id = $1 RETURNING *")
            .bind(issue_id)
            .fetch_one(pool)
            .await?;
    Ok(issue)
}
