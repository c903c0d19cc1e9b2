//! Translation of [`QueryOptions`] into parameterized SQL.
//!
//! Field names are interpolated directly; the query parser only admits
//! identifiers matching `[A-Za-z_][A-Za-z0-9_]*`. Values always travel as
//! positional arguments.

use inkwell_query::{Filter, Operator, QueryOptions, Value};

/// A SQL fragment or statement with its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub sql: String,
    pub args: Vec<Value>,
}

fn sql_operator(op: Operator) -> &'static str {
    match op {
        Operator::Eq => "=",
        Operator::Ne => "!=",
        Operator::Gt => ">",
        Operator::Lt => "<",
        Operator::Gte => ">=",
        Operator::Lte => "<=",
    }
}

/// Build a `WHERE` clause with placeholders numbered from
/// `first_placeholder`. Empty filters yield an empty clause.
pub fn build_where(filters: &[Filter], first_placeholder: usize) -> SqlQuery {
    if filters.is_empty() {
        return SqlQuery {
            sql: String::new(),
            args: Vec::new(),
        };
    }

    let conditions: Vec<String> = filters
        .iter()
        .enumerate()
        .map(|(i, f)| {
            format!(
                "{} {} ${}",
                f.field,
                sql_operator(f.operator),
                first_placeholder + i
            )
        })
        .collect();

    SqlQuery {
        sql: format!("WHERE {}", conditions.join(" AND ")),
        args: filters.iter().map(|f| f.value.clone()).collect(),
    }
}

/// Build a `SELECT` over `table`.
///
/// One placeholder per filter in filter order, then `LIMIT` and `OFFSET`
/// placeholders when the limit or skip is non-zero.
pub fn build_select(table: &str, options: &QueryOptions) -> SqlQuery {
    let fields = if options.fields.is_empty() {
        "*".to_owned()
    } else {
        options.fields.join(", ")
    };

    let mut sql = format!("SELECT {fields} FROM {table}");
    let SqlQuery {
        sql: where_clause,
        mut args,
    } = build_where(&options.filters, 1);
    if !where_clause.is_empty() {
        sql.push(' ');
        sql.push_str(&where_clause);
    }

    if !options.sorts.is_empty() {
        let order: Vec<String> = options
            .sorts
            .iter()
            .map(|s| format!("{} {}", s.field, if s.descending { "DESC" } else { "ASC" }))
            .collect();
        sql.push_str(" ORDER BY ");
        sql.push_str(&order.join(", "));
    }

    if options.limit > 0 {
        args.push(Value::Integer(i64::try_from(options.limit).unwrap_or(i64::MAX)));
        sql.push_str(&format!(" LIMIT ${}", args.len()));
    }
    if options.skip > 0 {
        args.push(Value::Integer(i64::try_from(options.skip).unwrap_or(i64::MAX)));
        sql.push_str(&format!(" OFFSET ${}", args.len()));
    }

    SqlQuery { sql, args }
}

#[cfg(test)]
mod tests {
    use inkwell_query::{Sort, parse_filters};

    use super::*;

    #[test]
    fn greater_than_uses_one_placeholder() {
        let opts = QueryOptions::new().with_filters(parse_filters(&["age__>__30"]).unwrap());
        let query = build_select("users", &opts);
        assert_eq!(query.sql, "SELECT * FROM users WHERE age > $1");
        assert_eq!(query.args, vec![Value::Integer(30)]);
    }

    #[test]
    fn full_select_shape() {
        let opts = QueryOptions::new()
            .with_filters(parse_filters(&["status__==__active", "wallet_balance__!=__0"]).unwrap())
            .with_sorts(vec![Sort::desc("created_at"), Sort::asc("id")])
            .with_fields(vec!["id".into(), "email".into()]);
        let query = build_select("users", &opts);
        assert_eq!(
            query.sql,
            "SELECT id, email FROM users WHERE status = $1 AND wallet_balance != $2 \
             ORDER BY created_at DESC, id ASC"
        );
        assert_eq!(
            query.args,
            vec![Value::String("active".into()), Value::Integer(0)]
        );
    }

    #[test]
    fn every_operator_maps_to_sql() {
        let filters = parse_filters(&[
            "a__==__1", "b__!=__1", "c__>__1", "d__<__1", "e__>=__1", "f__<=__1",
        ])
        .unwrap();
        let clause = build_where(&filters, 1);
        assert_eq!(
            clause.sql,
            "WHERE a = $1 AND b != $2 AND c > $3 AND d < $4 AND e >= $5 AND f <= $6"
        );
    }

    #[test]
    fn where_clause_can_start_after_set_parameters() {
        let filters = parse_filters(&["id__==__7"]).unwrap();
        let clause = build_where(&filters, 3);
        assert_eq!(clause.sql, "WHERE id = $3");
        assert_eq!(clause.args, vec![Value::Identifier("7".into())]);
        assert!(build_where(&[], 1).sql.is_empty());
    }

    #[test]
    fn pagination_appends_placeholders() {
        let opts = QueryOptions::new()
            .with_filters(parse_filters(&["role__==__admin"]).unwrap())
            .with_limit(10)
            .with_skip(20);
        let query = build_select("users", &opts);
        assert_eq!(
            query.sql,
            "SELECT * FROM users WHERE role = $1 LIMIT $2 OFFSET $3"
        );
        assert_eq!(
            query.args,
            vec![
                Value::String("admin".into()),
                Value::Integer(10),
                Value::Integer(20)
            ]
        );
    }

    #[test]
    fn builder_is_deterministic() {
        let opts = QueryOptions::new()
            .with_filters(parse_filters(&["x__>=__1", "y__<__2"]).unwrap())
            .with_sorts(vec![Sort::asc("x")]);
        assert_eq!(build_select("t", &opts), build_select("t", &opts));
    }
}
