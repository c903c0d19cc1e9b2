use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::QueryAs;
use tracing::{debug, instrument};

use inkwell_core::{AccountStatus, Role, User};
use inkwell_query::{Filter, Patch, QueryOptions, Value};
use inkwell_store::{Repository, StoreError};

use crate::builder::{build_select, build_where};
use crate::config::PostgresConfig;
use crate::migrations;

const COLUMNS: &str = "first_name, last_name, username, email, password, status, role, \
                       avatar, avatar_folder, wallet_balance, created_at, updated_at";

/// Postgres-backed user repository using `sqlx`.
///
/// Identifiers are `BIGSERIAL` keys exposed as decimal strings.
pub struct PostgresUserRepository {
    pool: PgPool,
    table: String,
}

impl PostgresUserRepository {
    /// Connect to Postgres, build the pool and run migrations.
    pub async fn new(config: &PostgresConfig) -> Result<Self, StoreError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect(&config.url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Self::from_pool(pool, config).await
    }

    /// Create from an existing pool. Runs migrations on creation.
    pub async fn from_pool(pool: PgPool, config: &PostgresConfig) -> Result<Self, StoreError> {
        migrations::run_migrations(&pool, config)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(Self {
            pool,
            table: config.users_table(),
        })
    }
}

fn storage_error(e: &sqlx::Error) -> StoreError {
    StoreError::Storage(e.to_string())
}

/// Columns are flat; dotted paths would be read as table references.
fn flat_columns<'a>(fields: impl IntoIterator<Item = &'a str>) -> Result<(), StoreError> {
    match fields.into_iter().find(|field| field.contains('.')) {
        Some(field) => Err(StoreError::InvalidQuery(format!(
            "nested field '{field}' is not a users column"
        ))),
        None => Ok(()),
    }
}

fn filter_fields(filters: &[Filter]) -> impl Iterator<Item = &str> {
    filters.iter().map(|f| f.field.as_str())
}

type PgQueryAs<'q, O> = QueryAs<'q, Postgres, O, PgArguments>;

/// Bind a typed value. Identifiers must be numeric to match `BIGINT` keys.
fn bind_value<'q, O>(query: PgQueryAs<'q, O>, value: &Value) -> Result<PgQueryAs<'q, O>, StoreError> {
    Ok(match value {
        Value::String(s) => query.bind(s.clone()),
        Value::Integer(i) => query.bind(*i),
        Value::Float(f) => query.bind(*f),
        Value::Boolean(b) => query.bind(*b),
        Value::Identifier(id) => query.bind(id.parse::<i64>().map_err(|_| {
            StoreError::InvalidQuery(format!("identifier '{id}' is not a numeric user id"))
        })?),
        Value::Timestamp(ts) => query.bind(*ts),
    })
}

fn bind_all<'q, O>(mut query: PgQueryAs<'q, O>, values: &[Value]) -> Result<PgQueryAs<'q, O>, StoreError> {
    for value in values {
        query = bind_value(query, value)?;
    }
    Ok(query)
}

fn bind_user<'q, O>(query: PgQueryAs<'q, O>, user: &User) -> PgQueryAs<'q, O> {
    query
        .bind(user.first_name.clone())
        .bind(user.last_name.clone())
        .bind(user.username.clone())
        .bind(user.email.clone())
        .bind(user.password.clone())
        .bind(user.status.as_str())
        .bind(user.role.as_str())
        .bind(user.avatar.clone())
        .bind(user.avatar_folder.clone())
        .bind(user.wallet_balance)
        .bind(user.created_at)
        .bind(user.updated_at)
}

#[async_trait]
impl Repository<User> for PostgresUserRepository {
    #[instrument(skip_all, fields(table = %self.table))]
    async fn insert(&self, user: User) -> Result<String, StoreError> {
        let sql = format!(
            "INSERT INTO {} ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING id",
            self.table
        );

        let (id,): (i64,) = bind_user(sqlx::query_as(&sql), &user)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error(&e))?;

        debug!(id, "user inserted");
        Ok(id.to_string())
    }

    #[instrument(skip_all, fields(table = %self.table))]
    async fn find_one(&self, filters: &[Filter]) -> Result<Option<User>, StoreError> {
        flat_columns(filter_fields(filters))?;
        let options = QueryOptions::new()
            .with_filters(filters.to_vec())
            .with_limit(1);
        let query = build_select(&self.table, &options);

        let row = bind_all(sqlx::query_as::<_, UserRow>(&query.sql), &query.args)?
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error(&e))?;

        Ok(row.map(Into::into))
    }

    /// Projection is ignored; rows always decode into full users.
    #[instrument(skip_all, fields(table = %self.table))]
    async fn find(&self, options: &QueryOptions) -> Result<Vec<User>, StoreError> {
        flat_columns(
            filter_fields(&options.filters).chain(options.sorts.iter().map(|s| s.field.as_str())),
        )?;
        let options = options.clone().with_fields(Vec::new());
        let query = build_select(&self.table, &options);

        let rows: Vec<UserRow> = bind_all(sqlx::query_as(&query.sql), &query.args)?
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error(&e))?;

        debug!(count = rows.len(), "users found");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip_all, fields(table = %self.table))]
    async fn update_one(&self, filters: &[Filter], user: &User) -> Result<u64, StoreError> {
        flat_columns(filter_fields(filters))?;
        let clause = build_where(filters, 13);
        let sql = format!(
            "UPDATE {table} SET (first_name, last_name, username, email, password, status, role, \
             avatar, avatar_folder, wallet_balance, created_at, updated_at) = \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             WHERE id = (SELECT id FROM {table} {where_clause} LIMIT 1) RETURNING id",
            table = self.table,
            where_clause = clause.sql,
        );

        let query = bind_user(sqlx::query_as::<_, (i64,)>(&sql), user);
        let updated = bind_all(query, &clause.args)?
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error(&e))?;

        Ok(updated.len() as u64)
    }

    #[instrument(skip_all, fields(table = %self.table))]
    async fn update_fields(&self, filters: &[Filter], patch: &Patch) -> Result<u64, StoreError> {
        if patch.is_empty() {
            return Err(StoreError::InvalidQuery("patch has no fields".to_owned()));
        }
        flat_columns(filter_fields(filters).chain(patch.iter().map(|(field, _)| field)))?;

        let assignments: Vec<String> = patch
            .iter()
            .enumerate()
            .map(|(i, (field, _))| format!("{field} = ${}", i + 1))
            .collect();
        let clause = build_where(filters, patch.len() + 1);
        let sql = format!(
            "UPDATE {} SET {} {} RETURNING id",
            self.table,
            assignments.join(", "),
            clause.sql
        );

        let values: Vec<Value> = patch.iter().map(|(_, v)| v.clone()).collect();
        let query = bind_all(sqlx::query_as::<_, (i64,)>(&sql), &values)?;
        let updated = bind_all(query, &clause.args)?
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error(&e))?;

        debug!(matched = updated.len(), "users patched");
        Ok(updated.len() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(())
    }
}

/// Internal row type for mapping database rows to `User`.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    first_name: String,
    last_name: String,
    username: String,
    email: String,
    password: String,
    status: String,
    role: String,
    avatar: String,
    avatar_folder: String,
    wallet_balance: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: Some(row.id.to_string()),
            first_name: row.first_name,
            last_name: row.last_name,
            username: row.username,
            email: row.email,
            password: row.password,
            status: AccountStatus::from_str_loose(&row.status).unwrap_or_default(),
            role: Role::from_str_loose(&row.role).unwrap_or_default(),
            avatar: row.avatar,
            avatar_folder: row.avatar_folder,
            wallet_balance: row.wallet_balance,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
