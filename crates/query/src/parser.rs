use std::sync::LazyLock;

use regex::Regex;

use crate::error::ParseError;
use crate::filter::{Filter, Operator, Sort};
use crate::value::FieldTypes;

/// Separator between the parts of a filter or sort token.
const SEPARATOR: &str = "__";

/// Field names: an identifier with at most one nested segment.
static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z0-9_]+)?$").expect("field regex is valid")
});

/// Check that a field name is safe to hand to either store builder.
pub fn validate_field(field: &str) -> Result<(), ParseError> {
    if FIELD_RE.is_match(field) {
        Ok(())
    } else {
        Err(ParseError::InvalidField(field.to_owned()))
    }
}

/// Parse `field__symbol__value` tokens, inferring value kinds.
pub fn parse_filters<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Filter>, ParseError> {
    parse_filters_with(tokens, &FieldTypes::default())
}

/// Parse `field__symbol__value` tokens, coercing values with `types`.
///
/// A token splits on the first two separators only, so the value may itself
/// contain `__`.
pub fn parse_filters_with<S: AsRef<str>>(
    tokens: &[S],
    types: &FieldTypes,
) -> Result<Vec<Filter>, ParseError> {
    tokens
        .iter()
        .map(|token| parse_filter(token.as_ref(), types))
        .collect()
}

fn parse_filter(token: &str, types: &FieldTypes) -> Result<Filter, ParseError> {
    let mut parts = token.splitn(3, SEPARATOR);
    let (Some(field), Some(symbol), Some(raw)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ParseError::MalformedFilter(token.to_owned()));
    };

    let operator =
        Operator::from_symbol(symbol).ok_or_else(|| ParseError::UnsupportedOperator {
            token: token.to_owned(),
            symbol: symbol.to_owned(),
        })?;

    validate_field(field)?;
    let value = types.coerce(field, raw)?;

    Ok(Filter {
        field: field.to_owned(),
        operator,
        value,
    })
}

/// Parse `field__asc` / `field__desc` tokens. Directions are case-sensitive.
pub fn parse_sorts<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Sort>, ParseError> {
    tokens
        .iter()
        .map(|token| parse_sort(token.as_ref()))
        .collect()
}

fn parse_sort(token: &str) -> Result<Sort, ParseError> {
    let Some((field, direction)) = token.split_once(SEPARATOR) else {
        return Err(ParseError::MalformedSort(token.to_owned()));
    };

    let descending = match direction {
        "asc" => false,
        "desc" => true,
        _ => {
            return Err(ParseError::InvalidDirection {
                token: token.to_owned(),
                direction: direction.to_owned(),
            });
        }
    };

    validate_field(field)?;

    Ok(Sort {
        field: field.to_owned(),
        descending,
    })
}

/// Parse a comma-separated projection list.
///
/// Entries are trimmed and empty entries dropped; an empty or blank input
/// yields an empty list, meaning every field.
pub fn parse_fields(raw: &str) -> Result<Vec<String>, ParseError> {
    raw.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(|f| validate_field(f).map(|()| f.to_owned()))
        .collect()
}
