mod auth;
mod logging;
mod server;
mod storage;
mod stores;


pub use auth::*;
pub use logging::*;
pub use server::*;
pub use storage::*;
pub use stores::*;

use secrecy::SecretString;
use serde::Deserialize;

/// Environment variable overriding `auth.jwt_secret`.
pub const ENV_JWT_SECRET: &str = "INKWELL_JWT_SECRET";
/// Environment variable overriding `postgres.url`.
pub const ENV_POSTGRES_URL: &str = "INKWELL_POSTGRES_URL";
/// Environment variable overriding `mongo.uri`.
pub const ENV_MONGO_URI: &str = "INKWELL_MONGO_URI";

/// Top-level configuration for the Inkwell server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct InkwellConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Document store for posts and categories.
    #[serde(default)]
    pub mongo: MongoSection,
    /// Relational store for accounts.
    #[serde(default)]
    pub postgres: PostgresSection,
    /// Media storage.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Session token settings.
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl InkwellConfig {
    /// Parse a TOML document. An empty document yields every default.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Apply `INKWELL_*` secrets from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply `INKWELL_*` overrides using `lookup` to read variables. Empty
    /// values are ignored.
    pub fn apply_env_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(secret) = read(ENV_JWT_SECRET) {
            self.auth.jwt_secret = Some(SecretString::new(secret));
        }
        if let Some(url) = read(ENV_POSTGRES_URL) {
            self.postgres.url = Some(url);
        }
        if let Some(uri) = read(ENV_MONGO_URI) {
            self.mongo.uri = Some(uri);
        }
    }
}
