mod builder;
mod config;
mod migrations;
mod users;

pub use builder::{SqlQuery, build_select, build_where};
pub use config::PostgresConfig;
pub use migrations::run_migrations;
pub use users::PostgresUserRepository;
