use sqlx::PgPool;

use crate::config::PostgresConfig;

/// Create the users table and its indexes if they do not already exist.
pub async fn run_migrations(pool: &PgPool, config: &PostgresConfig) -> Result<(), sqlx::Error> {
    let table = config.users_table();
    let prefix = &config.table_prefix;

    let create_table = format!(
        "
        CREATE TABLE IF NOT EXISTS {table} (
            id              BIGSERIAL PRIMARY KEY,
            first_name      TEXT NOT NULL,
            last_name       TEXT NOT NULL,
            username        TEXT NOT NULL DEFAULT '',
            email           TEXT NOT NULL UNIQUE,
            password        TEXT NOT NULL,
            status          TEXT NOT NULL DEFAULT 'pending',
            role            TEXT NOT NULL DEFAULT 'basic',
            avatar          TEXT NOT NULL DEFAULT '',
            avatar_folder   TEXT NOT NULL DEFAULT '',
            wallet_balance  DOUBLE PRECISION NOT NULL DEFAULT 0,
            created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "
    );

    sqlx::query(&create_table).execute(pool).await?;

    let indexes = [
        format!("CREATE INDEX IF NOT EXISTS idx_{prefix}users_status ON {table} (status)"),
        format!("CREATE INDEX IF NOT EXISTS idx_{prefix}users_created ON {table} (created_at DESC)"),
    ];

    for idx in &indexes {
        sqlx::query(idx).execute(pool).await?;
    }

    Ok(())
}
