//! Enumerated value domains for plot/subdivision types and crop
//! categories. Matching is case-insensitive; the stored value keeps the
//! canonical casing from these lists.

use crate::error::ApiError;

pub const PLOT_TYPES: &[&str] = &[
    "Field",
    "Garden",
    "Greenhouse",
    "Orchard",
    "Vertical Farm",
    "Other",
];

pub const SUBDIVISION_TYPES: &[&str] = &[
    "Bed",
    "Row",
    "Block",
    "Greenhouse Section",
    "Other",
];

pub const CROP_CATEGORIES: &[&str] = &[
    "Vegetable",
    "Fruit",
    "Herb",
    "Grain",
    "Flower",
    "Other",
];

pub const UNIT_SYSTEMS: &[&str] = &["metric", "imperial"];

fn find_ci(domain: &'static [&'static str], value: &str) -> Option<&'static str> {
    domain
        .iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(value))
}

/// Validate a plot type and return its canonical casing
pub fn plot_type(value: &str) -> Result<&'static str, ApiError> {
    find_ci(PLOT_TYPES, value).ok_or_else(|| ApiError::bad_request("Invalid plot type"))
}

pub fn subdivision_type(value: &str) -> Result<&'static str, ApiError> {
    find_ci(SUBDIVISION_TYPES, value)
        .ok_or_else(|| ApiError::bad_request("Invalid subdivision type"))
}

pub fn crop_category(value: &str) -> Result<&'static str, ApiError> {
    find_ci(CROP_CATEGORIES, value).ok_or_else(|| ApiError::bad_request("Invalid crop category"))
}

pub fn unit_system(value: &str) -> Result<&'static str, ApiError> {
    find_ci(UNIT_SYSTEMS, value).ok_or_else(|| ApiError::bad_request("Invalid unit system"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_match_is_case_insensitive() {
        assert_eq!(plot_type("garden").unwrap(), "Garden");
        assert_eq!(plot_type("GARDEN").unwrap(), "Garden");
        assert_eq!(subdivision_type("bed").unwrap(), "Bed");
        assert_eq!(crop_category("vegetable").unwrap(), "Vegetable");
    }

    #[test]
    fn rejects_values_outside_domain() {
        assert_eq!(
            plot_type("Swamp").unwrap_err().details(),
            "Invalid plot type"
        );
        assert_eq!(
            subdivision_type("Wing").unwrap_err().details(),
            "Invalid subdivision type"
        );
        assert_eq!(
            crop_category("Mineral").unwrap_err().details(),
            "Invalid crop category"
        );
    }
}
