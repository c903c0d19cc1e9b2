//! Filter, sort and projection evaluation over JSON documents.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use inkwell_query::{Filter, Operator, Sort, Value};
use serde_json::{Map, Value as Json};

/// Resolve a dotted path (`author.name`) inside a JSON object.
pub fn lookup<'a>(doc: &'a Json, path: &str) -> Option<&'a Json> {
    path.split('.').try_fold(doc, |current, key| current.get(key))
}

/// Set a dotted path, creating intermediate objects as needed.
pub fn assign(doc: &mut Json, path: &str, value: Json) {
    let mut current = doc;
    let mut parts = path.split('.').peekable();
    while let Some(key) = parts.next() {
        if !current.is_object() {
            *current = Json::Object(Map::new());
        }
        let Json::Object(map) = current else {
            return;
        };
        if parts.peek().is_none() {
            map.insert(key.to_owned(), value);
            return;
        }
        current = map
            .entry(key.to_owned())
            .or_insert_with(|| Json::Object(Map::new()));
    }
}

/// Whether `doc` satisfies every filter.
pub fn matches_all(doc: &Json, filters: &[Filter]) -> bool {
    filters.iter().all(|f| matches(doc, f))
}

/// Evaluate one filter the way a document store would.
///
/// A missing field only satisfies `ne`. Array fields match when any element
/// matches, except `ne`, which requires every element to differ.
pub fn matches(doc: &Json, filter: &Filter) -> bool {
    let Some(field) = lookup(doc, &filter.field) else {
        return filter.operator == Operator::Ne;
    };

    if let Json::Array(items) = field {
        return if filter.operator == Operator::Ne {
            items
                .iter()
                .all(|item| compare(item, &filter.value) != Some(Ordering::Equal))
        } else {
            items
                .iter()
                .any(|item| satisfies(compare(item, &filter.value), filter.operator))
        };
    }

    satisfies(compare(field, &filter.value), filter.operator)
}

fn satisfies(ordering: Option<Ordering>, operator: Operator) -> bool {
    match (operator, ordering) {
        (Operator::Ne, Some(o)) => o != Ordering::Equal,
        (Operator::Ne, None) => true,
        (_, None) => false,
        (Operator::Eq, Some(o)) => o == Ordering::Equal,
        (Operator::Gt, Some(o)) => o == Ordering::Greater,
        (Operator::Lt, Some(o)) => o == Ordering::Less,
        (Operator::Gte, Some(o)) => o != Ordering::Less,
        (Operator::Lte, Some(o)) => o != Ordering::Greater,
    }
}

/// Compare a stored JSON value against a filter value. `None` means the
/// types are not comparable.
fn compare(stored: &Json, value: &Value) -> Option<Ordering> {
    match (stored, value) {
        (Json::String(s), Value::String(v) | Value::Identifier(v)) => Some(s.as_str().cmp(v)),
        (Json::String(s), Value::Timestamp(ts)) => parse_timestamp(s).map(|st| st.cmp(ts)),
        (Json::Number(n), Value::Integer(i)) => match n.as_i64() {
            Some(stored) => Some(stored.cmp(i)),
            #[allow(clippy::cast_precision_loss)]
            None => n.as_f64().and_then(|f| f.partial_cmp(&(*i as f64))),
        },
        (Json::Number(n), Value::Float(f)) => n.as_f64().and_then(|stored| stored.partial_cmp(f)),
        (Json::Bool(b), Value::Boolean(v)) => Some(b.cmp(v)),
        _ => None,
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Order two documents by the given sort keys. Missing values sort first.
pub fn compare_docs(a: &Json, b: &Json, sorts: &[Sort]) -> Ordering {
    for sort in sorts {
        let ordering = compare_json(lookup(a, &sort.field), lookup(b, &sort.field));
        let ordering = if sort.descending {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn compare_json(a: Option<&Json>, b: Option<&Json>) -> Ordering {
    match (a, b) {
        (None | Some(Json::Null), None | Some(Json::Null)) => Ordering::Equal,
        (None | Some(Json::Null), _) => Ordering::Less,
        (_, None | Some(Json::Null)) => Ordering::Greater,
        (Some(Json::Number(x)), Some(Json::Number(y))) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .zip(y.as_f64())
                .and_then(|(x, y)| x.partial_cmp(&y))
                .unwrap_or(Ordering::Equal),
        },
        (Some(Json::String(x)), Some(Json::String(y))) => {
            match (parse_timestamp(x), parse_timestamp(y)) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(Json::Bool(x)), Some(Json::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Keep only the listed paths plus `id_field`.
pub fn project(doc: &Json, fields: &[String], id_field: &str) -> Json {
    let mut out = Json::Object(Map::new());
    for path in fields.iter().map(String::as_str).chain(std::iter::once(id_field)) {
        if let Some(value) = lookup(doc, path) {
            assign(&mut out, path, value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_field_only_matches_ne() {
        let doc = json!({"title": "a"});
        assert!(!matches(&doc, &Filter::eq("views", 1_i64)));
        assert!(matches(&doc, &Filter::new("views", Operator::Ne, 1_i64)));
    }

    #[test]
    fn array_fields_match_any_element() {
        let doc = json!({"categories": ["rust", "go"]});
        assert!(matches(&doc, &Filter::eq("categories", "go")));
        assert!(!matches(&doc, &Filter::eq("categories", "zig")));
        assert!(!matches(
            &doc,
            &Filter::new("categories", Operator::Ne, "rust")
        ));
        assert!(matches(&doc, &Filter::new("categories", Operator::Ne, "zig")));
    }

    #[test]
    fn type_mismatch_never_matches_comparisons() {
        let doc = json!({"age": "thirty"});
        assert!(!matches(&doc, &Filter::new("age", Operator::Gt, 30_i64)));
        assert!(matches(&doc, &Filter::new("age", Operator::Ne, 30_i64)));
    }

    #[test]
    fn integers_compare_against_floats() {
        let doc = json!({"score": 2.5});
        assert!(matches(&doc, &Filter::new("score", Operator::Gt, 2_i64)));
        assert!(matches(&doc, &Filter::new("score", Operator::Lte, 2.5)));
    }

    #[test]
    fn dotted_paths_resolve_nested_values() {
        let doc = json!({"author": {"name": "ada"}});
        assert!(matches(&doc, &Filter::eq("author.name", "ada")));

        let mut out = json!({});
        assign(&mut out, "author.name", json!("grace"));
        assert_eq!(out, json!({"author": {"name": "grace"}}));
    }

    #[test]
    fn sort_puts_missing_values_first() {
        let mut docs = vec![json!({"n": 2}), json!({}), json!({"n": 1})];
        docs.sort_by(|a, b| compare_docs(a, b, &[Sort::asc("n")]));
        assert_eq!(docs, vec![json!({}), json!({"n": 1}), json!({"n": 2})]);
    }

    #[test]
    fn sort_compares_timestamps_chronologically() {
        let earlier = json!({"at": "2024-01-01T10:00:00+02:00"});
        let later = json!({"at": "2024-01-01T09:00:00Z"});
        assert_eq!(
            compare_docs(&earlier, &later, &[Sort::asc("at")]),
            Ordering::Less
        );
    }

    #[test]
    fn projection_keeps_the_id() {
        let doc = json!({"_id": "x", "title": "t", "body": "b"});
        assert_eq!(
            project(&doc, &["title".to_owned()], "_id"),
            json!({"_id": "x", "title": "t"})
        );
    }
}
