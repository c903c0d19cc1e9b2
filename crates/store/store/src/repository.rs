use async_trait::async_trait;
use inkwell_query::{Filter, Patch, QueryOptions};

use crate::document::Document;
use crate::error::StoreError;

/// Generic persistence for one document type.
///
/// Implementations translate filters into their backend's native query
/// language and return exactly what the backend matched; they never
/// re-filter results client-side. Filters are combined with logical AND.
#[async_trait]
pub trait Repository<T: Document>: Send + Sync {
    /// Insert a new document and return the identifier the backend assigned.
    async fn insert(&self, doc: T) -> Result<String, StoreError>;

    /// Return the first document matching every filter.
    async fn find_one(&self, filters: &[Filter]) -> Result<Option<T>, StoreError>;

    /// Return documents matching the options' filters, sorted, projected and
    /// paginated.
    async fn find(&self, options: &QueryOptions) -> Result<Vec<T>, StoreError>;

    /// Replace the first matching document's fields with `doc`, keeping its
    /// identifier. Returns the number of matched documents (0 or 1).
    async fn update_one(&self, filters: &[Filter], doc: &T) -> Result<u64, StoreError>;

    /// Set the patch's fields on every matching document. Returns the number
    /// of matched documents.
    async fn update_fields(&self, filters: &[Filter], patch: &Patch) -> Result<u64, StoreError>;

    /// Check backend connectivity.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
