use std::marker::PhantomData;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use tracing::{debug, instrument};

use inkwell_query::{FieldKind, Filter, Patch, QueryOptions};
use inkwell_store::{Document as Entity, Repository, StoreError};

use crate::builder::{build_filter, build_query, render_value};
use crate::config::MongoConfig;
use crate::convert::{from_stored, to_stored};

/// A connected MongoDB database shared by every document repository.
///
/// The driver client pools connections internally; clone the store (or the
/// repositories it hands out) instead of connecting twice.
#[derive(Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Build the client for `config`. The driver connects lazily, so this
    /// only fails on a malformed URI or options.
    pub async fn connect(config: &MongoConfig) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(config.uri.as_str())
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        options.app_name.clone_from(&config.app_name);

        let client =
            Client::with_options(options).map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self {
            database: client.database(&config.database),
        })
    }

    /// Create from an existing database handle (useful for testing).
    pub fn from_database(database: Database) -> Self {
        Self { database }
    }

    /// A repository over `T::COLLECTION`.
    pub fn repository<T: Entity>(&self) -> MongoRepository<T> {
        MongoRepository {
            collection: self.database.collection(T::COLLECTION),
            database: self.database.clone(),
            timestamp_fields: T::field_types()
                .fields_of_kind(FieldKind::Timestamp)
                .into_iter()
                .map(str::to_owned)
                .collect(),
            _marker: PhantomData,
        }
    }
}

/// MongoDB-backed repository for one document type.
pub struct MongoRepository<T> {
    collection: Collection<Document>,
    database: Database,
    timestamp_fields: Vec<String>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for MongoRepository<T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            database: self.database.clone(),
            timestamp_fields: self.timestamp_fields.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> MongoRepository<T> {
    fn encode(&self, entity: &T) -> Result<Document, StoreError> {
        let fields: Vec<&str> = self.timestamp_fields.iter().map(String::as_str).collect();
        to_stored(entity, &fields)
    }
}

fn storage_error(e: &mongodb::error::Error) -> StoreError {
    StoreError::Storage(e.to_string())
}

#[async_trait]
impl<T: Entity> Repository<T> for MongoRepository<T> {
    #[instrument(skip_all, fields(collection = T::COLLECTION))]
    async fn insert(&self, doc: T) -> Result<String, StoreError> {
        let stored = self.encode(&doc)?;
        let result = self
            .collection
            .insert_one(stored)
            .await
            .map_err(|e| storage_error(&e))?;

        let id = match result.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            Bson::String(s) => s,
            other => other.to_string(),
        };
        debug!(%id, "document inserted");
        Ok(id)
    }

    #[instrument(skip_all, fields(collection = T::COLLECTION))]
    async fn find_one(&self, filters: &[Filter]) -> Result<Option<T>, StoreError> {
        let found = self
            .collection
            .find_one(build_filter(filters))
            .await
            .map_err(|e| storage_error(&e))?;
        found.map(from_stored).transpose()
    }

    #[instrument(skip_all, fields(collection = T::COLLECTION))]
    async fn find(&self, options: &QueryOptions) -> Result<Vec<T>, StoreError> {
        let (filter, find_options) = build_query(options);
        let docs: Vec<Document> = self
            .collection
            .find(filter)
            .with_options(find_options)
            .await
            .map_err(|e| storage_error(&e))?
            .try_collect()
            .await
            .map_err(|e| storage_error(&e))?;

        debug!(count = docs.len(), "documents found");
        docs.into_iter().map(from_stored).collect()
    }

    #[instrument(skip_all, fields(collection = T::COLLECTION))]
    async fn update_one(&self, filters: &[Filter], doc: &T) -> Result<u64, StoreError> {
        let update = doc! { "$set": self.encode(doc)? };
        let result = self
            .collection
            .update_one(build_filter(filters), update)
            .await
            .map_err(|e| storage_error(&e))?;
        Ok(result.matched_count)
    }

    #[instrument(skip_all, fields(collection = T::COLLECTION))]
    async fn update_fields(&self, filters: &[Filter], patch: &Patch) -> Result<u64, StoreError> {
        let mut set = Document::new();
        for (field, value) in patch.iter() {
            set.insert(field, render_value(value));
        }
        let result = self
            .collection
            .update_many(build_filter(filters), doc! { "$set": set })
            .await
            .map_err(|e| storage_error(&e))?;
        debug!(matched = result.matched_count, "documents patched");
        Ok(result.matched_count)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(())
    }
}

#[cfg(all(test, feature = "integration"))]
mod integration_tests {
    use inkwell_store::testing::{ConformanceDoc, run_repository_conformance_tests};

    use super::*;

    #[tokio::test]
    async fn repository_conformance() {
        let config = MongoConfig::new(
            std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_owned()),
            format!("inkwell_test_{}", uuid::Uuid::new_v4().simple()),
        );
        let store = MongoStore::connect(&config)
            .await
            .expect("client creation should succeed");
        let repo = store.repository::<ConformanceDoc>();
        repo.ping().await.expect("mongo should be reachable");
        run_repository_conformance_tests(&repo)
            .await
            .expect("conformance tests should pass");
    }
}
