mod builder;
mod config;
mod convert;
mod repository;

pub use builder::{build_filter, build_query, render_value};
pub use config::MongoConfig;
pub use repository::{MongoRepository, MongoStore};
