//! List-endpoint query bag: defaults, positive-int validation of
//! limit/page, and per-entity sort resolution against an allow-list.

use serde::Deserialize;

use crate::config;
use crate::error::ApiError;
use crate::query::select::SortDirection;
use crate::verify;

/// Untyped query-parameter bag shared by every list endpoint. Entity
/// services only read the filters that apply to them.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub sort: Option<String>,
    pub order: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub category: Option<String>,
    pub is_critical: Option<String>,
    pub is_resolved: Option<String>,
    pub is_done: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub limit: i64,
    pub page: i64,
}

impl Pagination {
    /// Apply defaults, then validate both values as positive integers
    pub fn from_params(params: &ListParams) -> Result<Self, ApiError> {
        let defaults = &config::config().pagination;
        let default_limit = defaults.default_limit.to_string();
        let default_page = defaults.default_page.to_string();

        let limit = verify::positive_int(params.limit.as_deref().unwrap_or(&default_limit))?;
        let page = verify::positive_int(params.page.as_deref().unwrap_or(&default_page))?;
        Ok(Self { limit, page })
    }
}

/// Per-entity sorting rules: the allowed sort columns, which of them are
/// nullable (and therefore null-excluded when sorted on), the default
/// column, and the display key used for tie-breaking.
#[derive(Debug, Clone, Copy)]
pub struct SortSpec {
    pub columns: &'static [&'static str],
    pub nullable: &'static [&'static str],
    pub default: &'static str,
    /// Natural display key (name/title): tie-break column, and sorting by
    /// it is always ascending regardless of the requested order
    pub display_key: &'static str,
}

impl SortSpec {
    /// Validate `sort`/`order` from the bag and resolve the effective
    /// column and direction
    pub fn resolve(&self, params: &ListParams) -> Result<(&'static str, SortDirection), ApiError> {
        let sort = params.sort.as_deref().unwrap_or(self.default);
        verify::query_value(self.columns, sort)?;
        // map back to the static str so callers can interpolate it
        let sort = self
            .columns
            .iter()
            .copied()
            .find(|c| *c == sort)
            .unwrap_or(self.default);

        let order = params.order.as_deref().unwrap_or("desc");
        verify::query_value(&["asc", "desc"], order)?;

        let direction = if sort == self.display_key {
            SortDirection::Asc
        } else {
            SortDirection::from_order(order)
        };
        Ok((sort, direction))
    }

    /// Tie-break column, absent when the primary sort already is the
    /// display key
    pub fn tie_break(&self, sort: &str) -> Option<&'static str> {
        (sort != self.display_key).then_some(self.display_key)
    }

    pub fn is_nullable(&self, sort: &str) -> bool {
        self.nullable.contains(&sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CROP_SORT: SortSpec = SortSpec {
        columns: &[
            "crop_id",
            "name",
            "category",
            "quantity",
            "date_planted",
            "harvest_date",
        ],
        nullable: &["quantity", "date_planted", "harvest_date"],
        default: "crop_id",
        display_key: "name",
    };

    fn params(sort: Option<&str>, order: Option<&str>) -> ListParams {
        ListParams {
            sort: sort.map(String::from),
            order: order.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_to_entity_key_descending() {
        let (sort, dir) = CROP_SORT.resolve(&params(None, None)).unwrap();
        assert_eq!(sort, "crop_id");
        assert_eq!(dir, SortDirection::Desc);
    }

    #[test]
    fn rejects_unknown_sort_column() {
        let err = CROP_SORT.resolve(&params(Some("password"), None)).unwrap_err();
        assert_eq!(err.details(), "Invalid query value");
    }

    #[test]
    fn rejects_unknown_order() {
        let err = CROP_SORT
            .resolve(&params(Some("name"), Some("upward")))
            .unwrap_err();
        assert_eq!(err.details(), "Invalid query value");
    }

    #[test]
    fn name_sort_forces_ascending() {
        let (sort, dir) = CROP_SORT
            .resolve(&params(Some("name"), Some("desc")))
            .unwrap();
        assert_eq!(sort, "name");
        assert_eq!(dir, SortDirection::Asc);
    }

    #[test]
    fn tie_break_omitted_for_display_key() {
        assert_eq!(CROP_SORT.tie_break("name"), None);
        assert_eq!(CROP_SORT.tie_break("harvest_date"), Some("name"));
    }

    #[test]
    fn nullable_columns_flagged() {
        assert!(CROP_SORT.is_nullable("harvest_date"));
        assert!(!CROP_SORT.is_nullable("name"));
    }

    #[test]
    fn pagination_defaults_and_validation() {
        let p = Pagination::from_params(&ListParams::default()).unwrap();
        assert_eq!(p.limit, 10);
        assert_eq!(p.page, 1);

        let bad = ListParams {
            page: Some("0".to_string()),
            ..Default::default()
        };
        let err = Pagination::from_params(&bad).unwrap_err();
        assert_eq!(err.details(), "Value must be a positive integer");
    }
}
