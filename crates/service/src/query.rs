use inkwell_query::{
    FieldTypes, Pagination, ParseError, QueryOptions, parse_fields, parse_filters_with, parse_sorts,
};

/// Unparsed list query as received from a client.
#[derive(Debug, Clone, Default)]
pub struct RawQuery {
    /// `field__symbol__value` tokens, in request order.
    pub filters: Vec<String>,
    /// `field__asc` / `field__desc` tokens, in request order.
    pub sorts: Vec<String>,
    /// Comma-separated projection. Empty selects every field.
    pub fields: String,
    pub pagination: Pagination,
}

impl RawQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_filter(mut self, token: impl Into<String>) -> Self {
        self.filters.push(token.into());
        self
    }

    #[must_use]
    pub fn with_sort(mut self, token: impl Into<String>) -> Self {
        self.sorts.push(token.into());
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = fields.into();
        self
    }

    #[must_use]
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Parse every token, coercing filter values with `types`.
    pub fn parse(&self, types: &FieldTypes) -> Result<QueryOptions, ParseError> {
        Ok(QueryOptions::new()
            .with_filters(parse_filters_with(&self.filters, types)?)
            .with_sorts(parse_sorts(&self.sorts)?)
            .with_fields(parse_fields(&self.fields)?)
            .with_pagination(self.pagination))
    }
}

#[cfg(test)]
mod tests {
    use inkwell_query::{FieldKind, Operator, Value};

    use super::*;

    #[test]
    fn parses_all_parts() {
        let types = FieldTypes::new().with_field("views", FieldKind::Integer);
        let options = RawQuery::new()
            .with_filter("views__>=__10")
            .with_sort("title__asc")
            .with_fields("title, views")
            .with_pagination(Pagination::from_params(Some(3), Some(20)))
            .parse(&types)
            .unwrap();

        assert_eq!(options.filters.len(), 1);
        assert_eq!(options.filters[0].operator, Operator::Gte);
        assert_eq!(options.filters[0].value, Value::Integer(10));
        assert_eq!(options.sorts[0].field, "title");
        assert_eq!(options.fields, vec!["title", "views"]);
        assert_eq!(options.skip, 40);
        assert_eq!(options.limit, 20);
    }

    #[test]
    fn first_bad_token_fails() {
        let err = RawQuery::new()
            .with_sort("title__ASC")
            .parse(&FieldTypes::new())
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidDirection { .. }));
    }

    #[test]
    fn empty_query_is_first_default_page() {
        let options = RawQuery::new().parse(&FieldTypes::new()).unwrap();
        assert!(options.filters.is_empty());
        assert_eq!(options.skip, 0);
        assert_eq!(options.limit, 10);
    }
}
