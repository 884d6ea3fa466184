//! Request-parameter validation for the directory operations.
//!
//! Everything here runs before the first store round-trip: sort columns and
//! directions come from fixed allow-lists, page bounds are checked, and id
//! lists are shape-validated. The query builder only ever sees values that
//! passed through this module.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 500;

/// Raw query parameters for `GET /users`, as Axum deserializes them.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub filter: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Sort columns accepted by the listing operation.
/// Only these fixed identifiers are ever spliced into ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    UserId,
    Email,
    Name,
}

impl SortColumn {
    fn from_param(raw: &str) -> Option<Self> {
        match raw {
            "userId" => Some(SortColumn::UserId),
            "email" => Some(SortColumn::Email),
            "name" => Some(SortColumn::Name),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortColumn::UserId => "u.user_id",
            SortColumn::Email => "u.email",
            SortColumn::Name => "u.name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn from_param(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("asc") {
            Some(SortOrder::Asc)
        } else if raw.eq_ignore_ascii_case("desc") {
            Some(SortOrder::Desc)
        } else {
            None
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Validated listing parameters. Constructing one is the only validation
/// point; the query builder trusts these values unconditionally.
#[derive(Debug, Clone)]
pub struct ListParams {
    pub sort_by: SortColumn,
    pub sort_order: SortOrder,
    pub filter_terms: Vec<String>,
    pub page: i64,
    pub page_size: i64,
}

impl ListParams {
    pub fn from_query(query: ListUsersQuery) -> Result<Self, AppError> {
        let sort_by = match query.sort_by.as_deref() {
            None => SortColumn::UserId,
            Some(raw) => SortColumn::from_param(raw).ok_or_else(|| {
                AppError::InvalidParameter(format!(
                    "sortBy must be one of userId, email, name (got '{raw}')"
                ))
            })?,
        };

        let sort_order = match query.sort_order.as_deref() {
            None => SortOrder::Asc,
            Some(raw) => SortOrder::from_param(raw).ok_or_else(|| {
                AppError::InvalidParameter(format!("sortOrder must be ASC or DESC (got '{raw}')"))
            })?,
        };

        let page = query.page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::InvalidParameter(format!(
                "page must be >= 1 (got {page})"
            )));
        }

        let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(AppError::InvalidParameter(format!(
                "pageSize must be between 1 and {MAX_PAGE_SIZE} (got {page_size})"
            )));
        }

        // The OFFSET bind is an i64; a page whose window starts past that
        // range cannot address any row and must not reach the multiply in
        // `offset`.
        if (page - 1).checked_mul(page_size).is_none() {
            return Err(AppError::InvalidParameter(format!(
                "page {page} is out of range for pageSize {page_size}"
            )));
        }

        Ok(ListParams {
            sort_by,
            sort_order,
            filter_terms: split_filter_terms(query.filter.as_deref()),
            page,
            page_size,
        })
    }

    /// Zero-based row offset. Cannot overflow: `from_query` rejects any
    /// page whose window would start past the `i64` range.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// Splits the free-text filter into comma-separated terms.
/// Terms are trimmed; blanks are dropped. No filter means no terms.
pub fn split_filter_terms(filter: Option<&str>) -> Vec<String> {
    filter
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Extracts `userIds` from a JSON request body. The body must carry a
/// `userIds` array whose elements are all non-empty strings.
fn parse_user_ids(body: &Value) -> Result<Vec<String>, AppError> {
    let ids = body
        .get("userIds")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::InvalidParameter("userIds must be an array".to_string()))?;

    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        match id.as_str() {
            Some(s) if !s.trim().is_empty() => out.push(s.to_string()),
            _ => {
                return Err(AppError::InvalidParameter(
                    "userIds must contain only non-empty strings".to_string(),
                ))
            }
        }
    }
    Ok(out)
}

/// Id pair for the comparison operation: exactly two, in request order.
/// Duplicate ids are allowed here; the operation reports `NotFound` when
/// the store returns fewer than two rows.
pub fn comparison_ids(body: &Value) -> Result<(String, String), AppError> {
    let ids = parse_user_ids(body)?;
    match <[String; 2]>::try_from(ids) {
        Ok([first, second]) => Ok((first, second)),
        Err(ids) => Err(AppError::InvalidParameter(format!(
            "exactly two userIds are required (got {})",
            ids.len()
        ))),
    }
}

/// Id list for the batch operation: non-empty, duplicates collapsed with
/// first occurrence winning so the response order stays predictable.
pub fn batch_ids(body: &Value) -> Result<Vec<String>, AppError> {
    let ids = parse_user_ids(body)?;
    if ids.is_empty() {
        return Err(AppError::InvalidParameter(
            "userIds must not be empty".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    Ok(ids.into_iter().filter(|id| seen.insert(id.clone())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_apply_when_query_is_empty() {
        let params = ListParams::from_query(ListUsersQuery::default()).unwrap();
        assert_eq!(params.sort_by, SortColumn::UserId);
        assert_eq!(params.sort_order, SortOrder::Asc);
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, DEFAULT_PAGE_SIZE);
        assert!(params.filter_terms.is_empty());
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn every_allow_listed_sort_combination_is_accepted() {
        for sort_by in ["userId", "email", "name"] {
            for sort_order in ["ASC", "DESC", "asc", "desc"] {
                let query = ListUsersQuery {
                    sort_by: Some(sort_by.to_string()),
                    sort_order: Some(sort_order.to_string()),
                    ..Default::default()
                };
                assert!(ListParams::from_query(query).is_ok(), "{sort_by}/{sort_order}");
            }
        }
    }

    #[test]
    fn unknown_sort_column_is_rejected() {
        let query = ListUsersQuery {
            sort_by: Some("residence".to_string()),
            ..Default::default()
        };
        let err = ListParams::from_query(query).unwrap_err();
        assert!(matches!(err, AppError::InvalidParameter(_)));
    }

    #[test]
    fn sort_column_match_is_case_sensitive() {
        let query = ListUsersQuery {
            sort_by: Some("userid".to_string()),
            ..Default::default()
        };
        assert!(ListParams::from_query(query).is_err());
    }

    #[test]
    fn unknown_sort_order_is_rejected() {
        let query = ListUsersQuery {
            sort_order: Some("sideways".to_string()),
            ..Default::default()
        };
        assert!(ListParams::from_query(query).is_err());
    }

    #[test]
    fn zero_or_negative_page_is_rejected() {
        for page in [0, -3] {
            let query = ListUsersQuery {
                page: Some(page),
                ..Default::default()
            };
            assert!(ListParams::from_query(query).is_err(), "page {page}");
        }
    }

    #[test]
    fn page_size_bounds_are_enforced() {
        for page_size in [0, -1, MAX_PAGE_SIZE + 1] {
            let query = ListUsersQuery {
                page_size: Some(page_size),
                ..Default::default()
            };
            assert!(ListParams::from_query(query).is_err(), "pageSize {page_size}");
        }

        let query = ListUsersQuery {
            page_size: Some(MAX_PAGE_SIZE),
            ..Default::default()
        };
        assert!(ListParams::from_query(query).is_ok());
    }

    #[test]
    fn offset_is_zero_based_from_one_based_page() {
        let query = ListUsersQuery {
            page: Some(3),
            page_size: Some(25),
            ..Default::default()
        };
        let params = ListParams::from_query(query).unwrap();
        assert_eq!(params.offset(), 50);
    }

    #[test]
    fn page_windows_past_the_i64_range_are_rejected() {
        let query = ListUsersQuery {
            page: Some(1_000_000_000_000_000_000),
            page_size: Some(MAX_PAGE_SIZE),
            ..Default::default()
        };
        let err = ListParams::from_query(query).unwrap_err();
        assert!(matches!(err, AppError::InvalidParameter(_)));

        let query = ListUsersQuery {
            page: Some(i64::MAX),
            ..Default::default()
        };
        assert!(ListParams::from_query(query).is_err());
    }

    #[test]
    fn deepest_addressable_page_still_validates() {
        let page = i64::MAX / MAX_PAGE_SIZE;
        let query = ListUsersQuery {
            page: Some(page),
            page_size: Some(MAX_PAGE_SIZE),
            ..Default::default()
        };
        let params = ListParams::from_query(query).unwrap();
        assert_eq!(params.offset(), (page - 1) * MAX_PAGE_SIZE);
    }

    #[test]
    fn filter_terms_are_split_trimmed_and_deblanked() {
        assert!(split_filter_terms(None).is_empty());
        assert_eq!(split_filter_terms(Some("rust")), vec!["rust"]);
        assert_eq!(
            split_filter_terms(Some(" rust , postgres ,,")),
            vec!["rust", "postgres"]
        );
        assert!(split_filter_terms(Some(" , ")).is_empty());
    }

    #[test]
    fn comparison_requires_exactly_two_ids() {
        assert!(comparison_ids(&json!({ "userIds": ["u1"] })).is_err());
        assert!(comparison_ids(&json!({ "userIds": ["u1", "u2", "u3"] })).is_err());

        let (first, second) = comparison_ids(&json!({ "userIds": ["u1", "u2"] })).unwrap();
        assert_eq!(first, "u1");
        assert_eq!(second, "u2");
    }

    #[test]
    fn comparison_keeps_duplicate_ids_for_the_store_to_reject() {
        let (first, second) = comparison_ids(&json!({ "userIds": ["u1", "u1"] })).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn batch_ids_rejects_missing_or_malformed_bodies() {
        assert!(batch_ids(&json!({})).is_err());
        assert!(batch_ids(&json!({ "userIds": "u1" })).is_err());
        assert!(batch_ids(&json!({ "userIds": [1, 2] })).is_err());
        assert!(batch_ids(&json!({ "userIds": ["u1", ""] })).is_err());
        assert!(batch_ids(&json!({ "userIds": [] })).is_err());
    }

    #[test]
    fn batch_ids_collapses_duplicates_keeping_first_occurrence() {
        let ids = batch_ids(&json!({ "userIds": ["u2", "u1", "u2"] })).unwrap();
        assert_eq!(ids, vec!["u2", "u1"]);
    }
}
