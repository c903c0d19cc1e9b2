use serde::Deserialize;

/// Document store holding posts and categories.
///
/// When `uri` is unset the server keeps documents in memory.
///
/// # Example
///
/// ```toml
/// [mongo]
/// uri = "mongodb://localhost:27017"
/// database = "inkwell"
/// ```
#[derive(Debug, Deserialize)]
pub struct MongoSection {
    /// Connection string.
    pub uri: Option<String>,
    /// Database holding every collection.
    #[serde(default = "default_database")]
    pub database: String,
}

impl Default for MongoSection {
    fn default() -> Self {
        Self {
            uri: None,
            database: default_database(),
        }
    }
}

/// Relational store holding user accounts.
///
/// When `url` is unset the server keeps accounts in memory.
#[derive(Debug, Deserialize)]
pub struct PostgresSection {
    /// Connection URL.
    pub url: Option<String>,
    /// Maximum pool size.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    /// Prefix applied to table names.
    #[serde(default)]
    pub table_prefix: String,
}

impl Default for PostgresSection {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: default_pool_size(),
            table_prefix: String::new(),
        }
    }
}

fn default_database() -> String {
    "inkwell".to_owned()
}

fn default_pool_size() -> u32 {
    5
}
