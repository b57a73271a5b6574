//! Dynamic SELECT assembly: a conjunction of optional parameterized
//! predicates plus a sort/paginate tail.
//!
//! Values are always bound as `$n` parameters; identifiers (sort columns,
//! group keys) are interpolated only after validation against a per-entity
//! allow-list. The two concerns never mix.

use serde_json::Value;
use sqlx::{postgres::PgArguments, FromRow, PgPool, Row};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse an already-validated order value ("asc"/"desc")
    pub fn from_order(order: &str) -> Self {
        if order.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn to_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqlStatement {
    pub query: String,
    pub params: Vec<Value>,
}

/// Builder for a filtered/sorted/paginated data query and its matching
/// count query. Both share the same WHERE text and bound parameters; the
/// count query drops joins, grouping, ordering and pagination.
pub struct SelectQuery {
    select_from: String,
    conditions: Vec<String>,
    params: Vec<Value>,
    group_by: Option<String>,
    order_by: Option<String>,
    limit_offset: Option<(i64, i64)>,
}

impl SelectQuery {
    /// `select_from` is the full SELECT ... FROM ... [JOIN ...] head
    pub fn new(select_from: impl Into<String>) -> Self {
        Self {
            select_from: select_from.into(),
            conditions: vec![],
            params: vec![],
            group_by: None,
            order_by: None,
            limit_offset: None,
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    /// `column = $n`
    pub fn and_eq(&mut self, column: &str, value: Value) -> &mut Self {
        let p = self.param(value);
        self.conditions.push(format!("{} = {}", column, p));
        self
    }

    /// Case-insensitive exact match: `LOWER(column) = LOWER($n)`
    pub fn and_eq_fold_case(&mut self, column: &str, value: &str) -> &mut Self {
        let p = self.param(Value::String(value.to_string()));
        self.conditions
            .push(format!("LOWER({}) = LOWER({})", column, p));
        self
    }

    /// Case-insensitive substring match: `column ILIKE $n` with %value%
    pub fn and_contains(&mut self, column: &str, value: &str) -> &mut Self {
        let p = self.param(Value::String(format!("%{}%", value)));
        self.conditions.push(format!("{} ILIKE {}", column, p));
        self
    }

    /// `column IS NOT NULL`, used when sorting on a nullable column so
    /// rows and count stay consistent
    pub fn and_not_null(&mut self, column: &str) -> &mut Self {
        self.conditions.push(format!("{} IS NOT NULL", column));
        self
    }

    pub fn group_by(&mut self, expr: &str) -> &mut Self {
        self.group_by = Some(expr.to_string());
        self
    }

    /// Primary sort with an optional tie-break column, always ascending,
    /// appended after the primary key so equal rows order deterministically
    pub fn order_by(
        &mut self,
        column: &str,
        direction: SortDirection,
        tie_break: Option<&str>,
    ) -> &mut Self {
        let mut clause = format!("ORDER BY {} {}", column, direction.to_sql());
        if let Some(tb) = tie_break {
            clause.push_str(&format!(", {} ASC", tb));
        }
        self.order_by = Some(clause);
        self
    }

    /// `LIMIT limit OFFSET (page - 1) * limit`; applies to the data query
    /// only. The offset saturates rather than overflowing, so an absurdly
    /// large page yields an empty result and falls through to the
    /// empty-page 404.
    pub fn paginate(&mut self, limit: i64, page: i64) -> &mut Self {
        let offset = page.saturating_sub(1).saturating_mul(limit);
        self.limit_offset = Some((limit, offset));
        self
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Build the data statement
    pub fn build(&self) -> SqlStatement {
        let mut parts = vec![self.select_from.clone(), self.where_clause()];
        if let Some(g) = &self.group_by {
            parts.push(format!("GROUP BY {}", g));
        }
        if let Some(o) = &self.order_by {
            parts.push(o.clone());
        }
        if let Some((limit, offset)) = self.limit_offset {
            parts.push(format!("LIMIT {} OFFSET {}", limit, offset));
        }

        let query = parts
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        SqlStatement {
            query,
            params: self.params.clone(),
        }
    }

    /// Build the count statement over `from` (no joins), sharing the WHERE
    /// predicate and parameters with the data statement
    pub fn build_count(&self, from: &str) -> SqlStatement {
        let where_clause = self.where_clause();
        let query = if where_clause.is_empty() {
            format!("SELECT COUNT(*) AS count FROM {}", from)
        } else {
            format!("SELECT COUNT(*) AS count FROM {} {}", from, where_clause)
        };
        SqlStatement {
            query,
            params: self.params.clone(),
        }
    }

    pub async fn fetch_all<T>(&self, pool: &PgPool) -> Result<Vec<T>, ApiError>
    where
        T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let stmt = self.build();
        let mut q = sqlx::query_as::<_, T>(&stmt.query);
        for p in stmt.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(pool).await?;
        Ok(rows)
    }

    pub async fn fetch_count(&self, from: &str, pool: &PgPool) -> Result<i64, ApiError> {
        let stmt = self.build_count(from);
        let mut q = sqlx::query(&stmt.query);
        for p in stmt.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        // Arrays/objects never appear in this query surface
        _ => q,
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        _ => q,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assembles_conjunction_with_numbered_params() {
        let mut q = SelectQuery::new("SELECT * FROM crops c");
        q.and_eq("c.plot_id", json!(7));
        q.and_contains("c.name", "tomato");
        q.and_eq_fold_case("c.category", "Vegetable");

        let stmt = q.build();
        assert_eq!(
            stmt.query,
            "SELECT * FROM crops c WHERE c.plot_id = $1 AND c.name ILIKE $2 \
             AND LOWER(c.category) = LOWER($3)"
        );
        assert_eq!(stmt.params, vec![json!(7), json!("%tomato%"), json!("Vegetable")]);
    }

    #[test]
    fn order_by_appends_ascending_tie_break() {
        let mut q = SelectQuery::new("SELECT * FROM crops c");
        q.and_eq("c.plot_id", json!(1));
        q.order_by("c.quantity", SortDirection::Desc, Some("c.name"));

        let stmt = q.build();
        assert!(stmt.query.ends_with("ORDER BY c.quantity DESC, c.name ASC"));
    }

    #[test]
    fn sort_without_tie_break() {
        let mut q = SelectQuery::new("SELECT * FROM plots p");
        q.order_by("p.name", SortDirection::Asc, None);
        assert!(q.build().query.ends_with("ORDER BY p.name ASC"));
    }

    #[test]
    fn paginate_computes_offset_from_page() {
        let mut q = SelectQuery::new("SELECT * FROM plots p");
        q.and_eq("p.owner_id", json!(1));
        q.paginate(10, 3);
        assert!(q.build().query.ends_with("LIMIT 10 OFFSET 20"));

        let mut first = SelectQuery::new("SELECT * FROM plots p");
        first.paginate(5, 1);
        assert!(first.build().query.ends_with("LIMIT 5 OFFSET 0"));
    }

    #[test]
    fn paginate_saturates_on_huge_page_numbers() {
        let mut q = SelectQuery::new("SELECT * FROM plots p");
        q.paginate(10, i64::MAX);
        assert!(q
            .build()
            .query
            .ends_with(&format!("LIMIT 10 OFFSET {}", i64::MAX)));
    }

    #[test]
    fn count_shares_where_and_params_without_tail() {
        let mut q = SelectQuery::new(
            "SELECT c.*, s.name AS subdivision_name FROM crops c \
             LEFT JOIN subdivisions s ON s.subdivision_id = c.subdivision_id",
        );
        q.and_eq("c.plot_id", json!(4));
        q.and_not_null("c.harvest_date");
        q.order_by("c.harvest_date", SortDirection::Asc, Some("c.name"));
        q.paginate(10, 1);

        let count = q.build_count("crops c");
        assert_eq!(
            count.query,
            "SELECT COUNT(*) AS count FROM crops c WHERE c.plot_id = $1 \
             AND c.harvest_date IS NOT NULL"
        );
        assert_eq!(count.params, q.build().params);
    }

    #[test]
    fn not_null_excludes_rows_in_both_statements() {
        let mut q = SelectQuery::new("SELECT * FROM crops c");
        q.and_eq("c.plot_id", json!(1));
        q.and_not_null("c.date_planted");

        assert!(q.build().query.contains("c.date_planted IS NOT NULL"));
        assert!(q
            .build_count("crops c")
            .query
            .contains("c.date_planted IS NOT NULL"));
    }

    #[test]
    fn group_by_placed_before_order() {
        let mut q = SelectQuery::new(
            "SELECT p.*, COUNT(DISTINCT c.crop_id) AS crop_count FROM plots p \
             LEFT JOIN crops c ON c.plot_id = p.plot_id",
        );
        q.and_eq("p.owner_id", json!(2));
        q.group_by("p.plot_id");
        q.order_by("p.plot_id", SortDirection::Desc, Some("p.name"));
        q.paginate(10, 1);

        let sql = q.build().query;
        let g = sql.find("GROUP BY p.plot_id").unwrap();
        let o = sql.find("ORDER BY").unwrap();
        let l = sql.find("LIMIT").unwrap();
        assert!(g < o && o < l);
    }
}
