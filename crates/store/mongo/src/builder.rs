//! Translation of [`QueryOptions`] into a MongoDB filter document and
//! [`FindOptions`].

use inkwell_query::{Filter, Operator, QueryOptions, Value};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, DateTime as BsonDateTime, Document, doc};
use mongodb::options::FindOptions;

/// Build the filter document and find options for a query.
///
/// Callers map logical field names (`id`) to store keys (`_id`) first, see
/// [`QueryOptions::rename_field`].
pub fn build_query(options: &QueryOptions) -> (Document, FindOptions) {
    let filter = build_filter(&options.filters);

    let mut find = FindOptions::default();
    if !options.sorts.is_empty() {
        let mut sort = Document::new();
        for s in &options.sorts {
            sort.insert(s.field.clone(), if s.descending { -1 } else { 1 });
        }
        find.sort = Some(sort);
    }
    if !options.fields.is_empty() {
        let mut projection = Document::new();
        for field in &options.fields {
            projection.insert(field.clone(), 1);
        }
        find.projection = Some(projection);
    }
    if options.skip > 0 {
        find.skip = Some(options.skip);
    }
    if options.limit > 0 {
        find.limit = Some(i64::try_from(options.limit).unwrap_or(i64::MAX));
    }

    (filter, find)
}

/// Build a filter document. A lone equality writes the field directly; every
/// other operator nests `{ "$op": value }`. Predicates on the same field merge
/// into one operator document (equality as `$eq`), and a repeated operator
/// on a field goes into a top-level `$and`.
pub fn build_filter(filters: &[Filter]) -> Document {
    let mut doc = Document::new();
    let mut repeated: Vec<Bson> = Vec::new();

    for filter in filters {
        let value = render_value(&filter.value);
        let op = format!("${}", filter.operator.as_str());

        match doc.get_mut(&filter.field) {
            None if filter.operator == Operator::Eq => {
                doc.insert(filter.field.clone(), value);
            }
            None => {
                let mut nested = Document::new();
                nested.insert(op, value);
                doc.insert(filter.field.clone(), nested);
            }
            Some(Bson::Document(nested)) => {
                if nested.contains_key(&op) {
                    let mut extra = Document::new();
                    extra.insert(op, value);
                    let mut clause = Document::new();
                    clause.insert(filter.field.clone(), extra);
                    repeated.push(Bson::Document(clause));
                } else {
                    nested.insert(op, value);
                }
            }
            Some(scalar) => {
                let mut nested = Document::new();
                nested.insert("$eq", scalar.clone());
                if op == "$eq" {
                    let mut clause = Document::new();
                    clause.insert(filter.field.clone(), doc! { "$eq": value });
                    repeated.push(Bson::Document(clause));
                } else {
                    nested.insert(op, value);
                }
                *scalar = Bson::Document(nested);
            }
        }
    }

    if !repeated.is_empty() {
        doc.insert("$and", repeated);
    }
    doc
}

/// Render a typed value as BSON.
///
/// Identifiers that look like object ids (24 hex characters) become
/// `ObjectId`s; timestamps become BSON dates.
pub fn render_value(value: &Value) -> Bson {
    match value {
        Value::String(s) => Bson::String(s.clone()),
        Value::Integer(i) => Bson::Int64(*i),
        Value::Float(f) => Bson::Double(*f),
        Value::Boolean(b) => Bson::Boolean(*b),
        Value::Identifier(id) => ObjectId::parse_str(id)
            .map_or_else(|_| Bson::String(id.clone()), Bson::ObjectId),
        Value::Timestamp(ts) => Bson::DateTime(BsonDateTime::from_millis(ts.timestamp_millis())),
    }
}
