//! Verification primitives: small pure guards that translate a condition
//! into a typed rejection or pass through.
//!
//! Every resource service applies these in the same order: format checks,
//! then existence, then permission, then conflict, then business rules.

use crate::error::ApiError;

/// Parse a path/query value as a positive integer.
/// Rejects non-numeric, non-integral, zero and negative values.
pub fn positive_int(value: &str) -> Result<i64, ApiError> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| ApiError::bad_request("Value must be a positive integer"))
}

/// Positive-integer guard for values that arrive already numeric (JSON body IDs)
pub fn positive(value: i64) -> Result<i64, ApiError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(ApiError::bad_request("Value must be a positive integer"))
    }
}

/// Fail with 403 unless the authenticated identity matches the target.
/// Works for numeric ID comparisons and string username comparisons alike.
pub fn permission<T: PartialEq + ?Sized>(
    base: &T,
    target: &T,
    details: &str,
) -> Result<(), ApiError> {
    if base == target {
        Ok(())
    } else {
        Err(ApiError::forbidden(details))
    }
}

/// Fail with 400 when `value` is not a member of the allowed set
pub fn query_value(valid_values: &[&str], value: &str) -> Result<(), ApiError> {
    if valid_values.contains(&value) {
        Ok(())
    } else {
        Err(ApiError::bad_request("Invalid query value"))
    }
}

/// Fail with 400 when a caller-supplied boolean does not equal the only
/// value the endpoint accepts
pub fn boolean_value(actual: bool, expected: bool) -> Result<(), ApiError> {
    if actual == expected {
        Ok(())
    } else {
        Err(ApiError::bad_request("Invalid boolean value"))
    }
}

/// Fail with 404 when a page beyond the first came back empty.
/// An empty first page is a legitimate empty result, not an error.
pub fn pagination(page: i64, result_row_count: usize) -> Result<(), ApiError> {
    if page > 1 && result_row_count == 0 {
        Err(ApiError::not_found("Page not found"))
    } else {
        Ok(())
    }
}

/// Password policy: minimum length 8, at least one uppercase letter, one
/// lowercase letter and one digit
pub fn password_format(password: &str) -> Result<(), ApiError> {
    let long_enough = password.len() >= 8;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if long_enough && has_upper && has_lower && has_digit {
        Ok(())
    } else {
        Err(ApiError::bad_request("Invalid password format"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_int_accepts_positive() {
        assert_eq!(positive_int("1").unwrap(), 1);
        assert_eq!(positive_int("42").unwrap(), 42);
    }

    #[test]
    fn positive_int_rejects_bad_values() {
        for v in ["0", "-3", "abc", "1.5", "", "  "] {
            let err = positive_int(v).unwrap_err();
            assert_eq!(err.details(), "Value must be a positive integer", "{v:?}");
            assert_eq!(err.status_code(), 400);
        }
    }

    #[test]
    fn positive_rejects_non_positive() {
        assert!(positive(1).is_ok());
        assert!(positive(0).is_err());
        assert!(positive(-7).is_err());
    }

    #[test]
    fn permission_compares_ids_and_names() {
        assert!(permission(&1i64, &1i64, "Access denied").is_ok());
        let err = permission(&1i64, &2i64, "Access denied").unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.details(), "Access denied");

        assert!(permission("alice", "alice", "Access denied").is_ok());
        assert!(permission("alice", "bob", "Access denied").is_err());
    }

    #[test]
    fn query_value_checks_membership() {
        assert!(query_value(&["asc", "desc"], "asc").is_ok());
        let err = query_value(&["asc", "desc"], "sideways").unwrap_err();
        assert_eq!(err.details(), "Invalid query value");
    }

    #[test]
    fn boolean_value_requires_expected_literal() {
        assert!(boolean_value(true, true).is_ok());
        let err = boolean_value(false, true).unwrap_err();
        assert_eq!(err.details(), "Invalid boolean value");
    }

    #[test]
    fn pagination_only_fails_beyond_first_page() {
        assert!(pagination(1, 0).is_ok());
        assert!(pagination(1, 5).is_ok());
        assert!(pagination(3, 2).is_ok());
        let err = pagination(2, 0).unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.details(), "Page not found");
    }

    #[test]
    fn password_policy_vectors() {
        assert!(password_format("Abcd1234").is_ok());
        assert!(password_format("abcdefgh").is_err()); // no uppercase, no digit
        assert!(password_format("Abcdef1").is_err()); // too short
        assert!(password_format("").is_err());
        assert!(password_format("ABCDEFG1").is_err()); // no lowercase
    }
}
