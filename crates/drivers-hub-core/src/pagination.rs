//! Page-based pagination for list endpoints.
//!
//! List endpoints accept `?page=N&limit=M` (1-indexed page, limit clamped to
//! 1..=100, default 10) and answer with:
//!
//! ```json
//! { "data": [...], "meta": { "total": 42, "page": 2, "limit": 10, "total_pages": 5, "has_more": true } }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Treats empty query values (`?page=`) as absent.
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.trim().parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Items per page (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    /// Build response metadata once the total row count is known.
    pub fn meta(&self, total: i64) -> PaginationMeta {
        PaginationMeta::new(total, self.page(), self.limit())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub has_more: bool,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
        Self {
            total,
            page,
            limit,
            total_pages,
            has_more: page * limit < total,
        }
    }
}

/// A page of results plus its metadata.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), DEFAULT_LIMIT);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(PaginationParams::new(1, 0).limit(), 1);
        assert_eq!(PaginationParams::new(1, 5000).limit(), MAX_LIMIT);
        assert_eq!(PaginationParams::new(1, -3).limit(), 1);
    }

    #[test]
    fn test_offset_from_page() {
        assert_eq!(PaginationParams::new(3, 20).offset(), 40);
        assert_eq!(PaginationParams::new(0, 20).offset(), 0);
        assert_eq!(PaginationParams::new(-2, 20).offset(), 0);
    }

    #[test]
    fn test_meta_counts_pages() {
        let meta = PaginationMeta::new(42, 2, 10);
        assert_eq!(meta.total_pages, 5);
        assert!(meta.has_more);

        let last = PaginationMeta::new(42, 5, 10);
        assert!(!last.has_more);

        let empty = PaginationMeta::new(0, 1, 10);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_more);
    }

    #[test]
    fn test_empty_query_values_are_ignored() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"page": "", "limit": "25"}"#).unwrap();
        assert_eq!(params.page, None);
        assert_eq!(params.limit(), 25);
    }
}
