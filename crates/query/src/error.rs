use thiserror::Error;

/// Errors produced while parsing raw query tokens.
///
/// Every variant carries the offending token so the message can be echoed
/// back to the client verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The filter token did not split into `field__symbol__value`.
    #[error("invalid filter format: {0}")]
    MalformedFilter(String),

    /// The filter symbol is not one of the six supported comparisons.
    #[error("unsupported operator '{symbol}' in filter: {token}")]
    UnsupportedOperator {
        /// The raw filter token.
        token: String,
        /// The symbol that failed to map.
        symbol: String,
    },

    /// The sort token did not split into `field__direction`.
    #[error("invalid sort format: {0}")]
    MalformedSort(String),

    /// The sort direction was neither `asc` nor `desc`.
    #[error("invalid sort direction '{direction}' in sort: {token}")]
    InvalidDirection {
        /// The raw sort token.
        token: String,
        /// The direction suffix that was rejected.
        direction: String,
    },

    /// A field name contains characters that are not allowed.
    #[error("invalid field name: '{0}'")]
    InvalidField(String),

    /// The filter value could not be coerced into the field's declared kind.
    #[error("invalid value '{value}' for field '{field}': expected {expected}")]
    InvalidValue {
        /// The field the value was meant for.
        field: String,
        /// The raw value.
        value: String,
        /// Human-readable name of the expected kind.
        expected: &'static str,
    },
}
