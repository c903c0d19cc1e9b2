/// Configuration for the MongoDB document store.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// Connection string (e.g. `mongodb://localhost:27017`).
    pub uri: String,

    /// Database holding every collection.
    pub database: String,

    /// Application name reported to the server.
    pub app_name: Option<String>,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: String::from("mongodb://localhost:27017"),
            database: String::from("inkwell"),
            app_name: Some(String::from("inkwell")),
        }
    }
}

impl MongoConfig {
    /// Create a configuration for the given URI and database.
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    /// Set the application name.
    #[must_use]
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }
}
