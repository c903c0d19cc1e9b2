use crate::filter::{Filter, Sort};

/// Page size used when the caller gives none or an out-of-range one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Store-agnostic description of a query.
///
/// `skip` and `limit` of zero mean "no offset" and "unbounded" respectively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub filters: Vec<Filter>,
    pub sorts: Vec<Sort>,
    /// Projected fields. Empty means every field.
    pub fields: Vec<String>,
    pub skip: u64,
    pub limit: u64,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn with_sorts(mut self, sorts: Vec<Sort>) -> Self {
        self.sorts = sorts;
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Apply `skip`/`limit` from a page request.
    #[must_use]
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.skip = pagination.skip();
        self.limit = pagination.limit();
        self
    }

    /// Use `sorts` only when the caller did not request any ordering.
    #[must_use]
    pub fn with_default_sort(mut self, sorts: Vec<Sort>) -> Self {
        if self.sorts.is_empty() {
            self.sorts = sorts;
        }
        self
    }

    /// Rename a logical field to its store key in filters, sorts and the
    /// projection.
    pub fn rename_field(&mut self, from: &str, to: &str) {
        for filter in &mut self.filters {
            if filter.field == from {
                to.clone_into(&mut filter.field);
            }
        }
        for sort in &mut self.sorts {
            if sort.field == from {
                to.clone_into(&mut sort.field);
            }
        }
        for field in &mut self.fields {
            if field == from {
                to.clone_into(field);
            }
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.limit == 0
    }
}

/// A clamped page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Build from raw `page` / `page_size` parameters.
    ///
    /// Pages below 1 become 1; sizes outside `1..=MAX_PAGE_SIZE` become
    /// [`DEFAULT_PAGE_SIZE`].
    pub fn from_params(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = page
            .and_then(|p| u64::try_from(p).ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let page_size = page_size
            .and_then(|s| u64::try_from(s).ok())
            .filter(|s| (1..=MAX_PAGE_SIZE).contains(s))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self { page, page_size }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let p = Pagination::from_params(None, None);
        assert_eq!(p, Pagination::default());
        assert_eq!(p.skip(), 0);
        assert_eq!(p.limit(), 10);
    }

    #[test]
    fn pagination_clamps_out_of_range_values() {
        let p = Pagination::from_params(Some(0), Some(500));
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 10);

        let p = Pagination::from_params(Some(-3), Some(0));
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 10);

        let p = Pagination::from_params(Some(2), Some(-1));
        assert_eq!(p.page_size, 10);
    }

    #[test]
    fn pagination_keeps_boundary_size() {
        let p = Pagination::from_params(Some(3), Some(100));
        assert_eq!(p.page_size, 100);
        assert_eq!(p.skip(), 200);
        assert_eq!(p.limit(), 100);
    }

    #[test]
    fn pagination_does_not_overflow() {
        let p = Pagination::from_params(Some(i64::MAX), Some(100));
        assert_eq!(p.skip(), u64::MAX);
    }

    #[test]
    fn with_pagination_sets_skip_and_limit() {
        let opts = QueryOptions::new().with_pagination(Pagination::from_params(Some(2), Some(25)));
        assert_eq!(opts.skip, 25);
        assert_eq!(opts.limit, 25);
        assert!(!opts.is_unbounded());
    }

    #[test]
    fn default_sort_only_when_empty() {
        let opts = QueryOptions::new().with_default_sort(vec![Sort::desc("created_at")]);
        assert_eq!(opts.sorts, vec![Sort::desc("created_at")]);

        let opts = QueryOptions::new()
            .with_sorts(vec![Sort::asc("title")])
            .with_default_sort(vec![Sort::desc("created_at")]);
        assert_eq!(opts.sorts, vec![Sort::asc("title")]);
    }

    #[test]
    fn rename_field_touches_every_part() {
        let mut opts = QueryOptions::new()
            .with_filter(Filter::eq("id", "abc"))
            .with_filter(Filter::eq("title", "x"))
            .with_sorts(vec![Sort::desc("id")])
            .with_fields(vec!["id".into(), "title".into()]);

        opts.rename_field("id", "_id");

        assert_eq!(opts.filters[0].field, "_id");
        assert_eq!(opts.filters[1].field, "title");
        assert_eq!(opts.sorts[0].field, "_id");
        assert_eq!(opts.fields, vec!["_id".to_owned(), "title".to_owned()]);
    }
}
