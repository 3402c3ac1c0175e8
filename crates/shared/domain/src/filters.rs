//! Pagination and sorting for bulk reads.
//!
//! [`Filters`] is the validated shape of a list request. Stores turn it into
//! `ORDER BY <column> <direction>, id ASC LIMIT <limit> OFFSET <offset>`; the
//! trailing `id` keeps page boundaries stable when the sort column repeats.

use std::fmt;

use serde::Serialize;

use crate::constants::{
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, DEFAULT_SORT, DESCENDING_SORT_PREFIX, MAX_PAGE,
    MAX_PAGE_SIZE, MSG_GREATER_THAN_ZERO, MSG_INVALID_SORT, MSG_PAGE_MAXIMUM,
    MSG_PAGE_SIZE_MAXIMUM, USER_SORT_SAFELIST,
};
use crate::validator::{permitted_value, Validator};

/// Sort direction for the primary sort column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("ASC"),
            SortDirection::Desc => f.write_str("DESC"),
        }
    }
}

/// Page, page size and sort key of a list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
    pub sort_safelist: &'static [&'static str],
}

impl Filters {
    pub fn new(page: i64, page_size: i64, sort: impl Into<String>) -> Self {
        Self {
            page,
            page_size,
            sort: sort.into(),
            sort_safelist: USER_SORT_SAFELIST,
        }
    }

    /// Build filters from optional request parameters, filling in defaults for
    /// anything absent. An empty sort string counts as absent.
    pub fn from_params(page: Option<i64>, page_size: Option<i64>, sort: Option<String>) -> Self {
        let sort = sort
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SORT.to_string());

        Self::new(
            page.unwrap_or(DEFAULT_PAGE),
            page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            sort,
        )
    }

    /// Sort column with any leading `-` removed.
    pub fn sort_column(&self) -> &str {
        self.sort
            .strip_prefix(DESCENDING_SORT_PREFIX)
            .unwrap_or(&self.sort)
    }

    pub fn sort_direction(&self) -> SortDirection {
        if self.sort.starts_with(DESCENDING_SORT_PREFIX) {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn limit(&self) -> u64 {
        u64::try_from(self.page_size).unwrap_or_default()
    }

    pub fn offset(&self) -> u64 {
        let page = u64::try_from(self.page).unwrap_or_default();
        page.saturating_sub(1).saturating_mul(self.limit())
    }
}

impl Default for Filters {
    fn default() -> Self {
        Self::from_params(None, None, None)
    }
}

/// Check page bounds and the sort key against the safelist.
pub fn validate_filters(v: &mut Validator, filters: &Filters) {
    v.check(filters.page > 0, "page", MSG_GREATER_THAN_ZERO);
    v.check(filters.page <= MAX_PAGE, "page", MSG_PAGE_MAXIMUM);
    v.check(filters.page_size > 0, "page_size", MSG_GREATER_THAN_ZERO);
    v.check(
        filters.page_size <= MAX_PAGE_SIZE,
        "page_size",
        MSG_PAGE_SIZE_MAXIMUM,
    );
    v.check(
        permitted_value(filters.sort_column(), filters.sort_safelist),
        "sort",
        MSG_INVALID_SORT,
    );
}

/// Summary of where a page sits in the full result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetaData {
    pub current_page: u64,
    pub page_size: u64,
    pub first_page: u64,
    pub last_page: u64,
    pub total_records: u64,
}

impl MetaData {
    /// Derive metadata from a row count. Zero records yields all-zero metadata.
    pub fn calculate(total_records: u64, page: u64, page_size: u64) -> Self {
        if total_records == 0 || page_size == 0 {
            return Self::default();
        }

        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: total_records.div_ceil(page_size),
            total_records,
        }
    }

    /// Metadata for the page described by `filters`.
    pub fn for_filters(total_records: u64, filters: &Filters) -> Self {
        let page = u64::try_from(filters.page).unwrap_or_default();
        Self::calculate(total_records, page, filters.limit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors_for(filters: &Filters) -> Validator {
        let mut v = Validator::new();
        validate_filters(&mut v, filters);
        v
    }

    #[test]
    fn test_defaults() {
        let filters = Filters::default();
        assert_eq!(filters.page, 1);
        assert_eq!(filters.page_size, 20);
        assert_eq!(filters.sort, "id");
        assert!(errors_for(&filters).valid());
    }

    #[test]
    fn test_empty_sort_takes_default() {
        let filters = Filters::from_params(Some(2), Some(10), Some(String::new()));
        assert_eq!(filters.sort, "id");
        assert_eq!(filters.page, 2);
        assert_eq!(filters.page_size, 10);
    }

    #[test]
    fn test_page_bounds() {
        for page in [1, 2, 5_000_000, MAX_PAGE] {
            assert!(errors_for(&Filters::new(page, 20, "id")).valid(), "page {page}");
        }

        let v = errors_for(&Filters::new(0, 20, "id"));
        assert_eq!(v.errors().get("page"), Some("must be greater than zero"));

        let v = errors_for(&Filters::new(-3, 20, "id"));
        assert_eq!(v.errors().get("page"), Some("must be greater than zero"));

        let v = errors_for(&Filters::new(MAX_PAGE + 1, 20, "id"));
        assert_eq!(v.errors().get("page"), Some("must be a maximum of 10 million"));
    }

    #[test]
    fn test_page_size_bounds() {
        for page_size in [1, 50, MAX_PAGE_SIZE] {
            assert!(errors_for(&Filters::new(1, page_size, "id")).valid());
        }

        let v = errors_for(&Filters::new(1, 0, "id"));
        assert_eq!(v.errors().get("page_size"), Some("must be greater than zero"));

        let v = errors_for(&Filters::new(1, 101, "id"));
        assert_eq!(v.errors().get("page_size"), Some("must be a maximum of 100"));
    }

    #[test]
    fn test_sort_safelist() {
        for sort in USER_SORT_SAFELIST {
            assert!(errors_for(&Filters::new(1, 20, *sort)).valid());
            assert!(errors_for(&Filters::new(1, 20, format!("-{sort}"))).valid());
        }

        for sort in ["password", "-version", "--id", "id desc", "Name"] {
            let v = errors_for(&Filters::new(1, 20, sort));
            assert_eq!(v.errors().get("sort"), Some("invalid sort value"), "sort {sort}");
        }
    }

    #[test]
    fn test_sort_column_and_direction() {
        let asc = Filters::new(1, 20, "name");
        assert_eq!(asc.sort_column(), "name");
        assert_eq!(asc.sort_direction(), SortDirection::Asc);

        let desc = Filters::new(1, 20, "-created_at");
        assert_eq!(desc.sort_column(), "created_at");
        assert_eq!(desc.sort_direction(), SortDirection::Desc);
        assert_eq!(desc.sort_direction().to_string(), "DESC");
    }

    #[test]
    fn test_limit_and_offset() {
        let filters = Filters::new(3, 25, "id");
        assert_eq!(filters.limit(), 25);
        assert_eq!(filters.offset(), 50);

        assert_eq!(Filters::new(1, 20, "id").offset(), 0);
    }

    #[test]
    fn test_metadata_empty() {
        assert_eq!(MetaData::calculate(0, 1, 20), MetaData::default());
    }

    #[test]
    fn test_metadata_partial_last_page() {
        let meta = MetaData::calculate(51, 2, 20);
        assert_eq!(meta.current_page, 2);
        assert_eq!(meta.page_size, 20);
        assert_eq!(meta.first_page, 1);
        assert_eq!(meta.last_page, 3);
        assert_eq!(meta.total_records, 51);
    }

    #[test]
    fn test_metadata_exact_multiple() {
        assert_eq!(MetaData::calculate(40, 1, 20).last_page, 2);
        assert_eq!(MetaData::calculate(1, 1, 100).last_page, 1);
    }
}
