//! Query-string handling for list and write endpoints.
//!
//! `filter` and `sort` may repeat; every occurrence is kept in request order,
//! which a plain `Query<T>` extractor cannot express.

use inkwell_query::Pagination;
use inkwell_service::RawQuery;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ServerError;

/// List query parameters (documentation only; parsed by [`list_query`]).
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// `field__symbol__value`; repeat for more filters.
    #[param(example = "title__==__Hello")]
    pub filter: Option<Vec<String>>,
    /// `field__asc` or `field__desc`; repeat for more sort keys.
    #[param(example = "created_at__desc")]
    pub sort: Option<Vec<String>>,
    /// Comma-separated projection.
    #[param(example = "title,author_id")]
    pub fields: Option<String>,
    /// 1-based page, default 1.
    pub page: Option<i64>,
    /// Items per page, default 10, at most 100.
    pub page_size: Option<i64>,
}

/// Write filter parameters (documentation only; parsed by [`filter_tokens`]).
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FilterParams {
    /// `field__symbol__value`; at least one is required.
    #[param(example = "id__==__65f1c0ffee0000000000beef")]
    pub filter: Vec<String>,
}

fn pairs(raw: Option<&str>) -> Result<Vec<(String, String)>, ServerError> {
    serde_urlencoded::from_str(raw.unwrap_or_default())
        .map_err(|e| ServerError::BadRequest(format!("invalid query string: {e}")))
}

/// Collect a [`RawQuery`] from a query string. Unparsable page numbers fall
/// back to their defaults.
pub fn list_query(raw: Option<&str>) -> Result<RawQuery, ServerError> {
    let mut query = RawQuery::new();
    let mut page = None;
    let mut page_size = None;

    for (key, value) in pairs(raw)? {
        match key.as_str() {
            "filter" => query.filters.push(value),
            "sort" => query.sorts.push(value),
            "fields" => query.fields = value,
            "page" => page = value.trim().parse().ok(),
            "page_size" => page_size = value.trim().parse().ok(),
            _ => {}
        }
    }

    Ok(query.with_pagination(Pagination::from_params(page, page_size)))
}

/// Every `filter` value in request order.
pub fn filter_tokens(raw: Option<&str>) -> Result<Vec<String>, ServerError> {
    Ok(pairs(raw)?
        .into_iter()
        .filter(|(key, _)| key == "filter")
        .map(|(_, value)| value)
        .collect())
}
