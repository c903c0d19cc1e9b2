pub mod document;
pub mod error;
pub mod repository;
pub mod testing;

pub use document::Document;
pub use error::StoreError;
pub use repository::Repository;
