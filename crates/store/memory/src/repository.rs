use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use inkwell_query::{Filter, Patch, QueryOptions};
use serde_json::Value as Json;
use tracing::debug;

use inkwell_store::{Document, Repository, StoreError};

use crate::matcher;

/// In-memory repository using `DashMap`. Suitable for development and testing.
///
/// Documents are held as JSON so that filters, sorts and projections behave
/// like they would against a document store. Identifiers are 24 hex
/// characters, the same shape as a document-store object id.
pub struct MemoryRepository<T> {
    /// Primary store: id -> (insertion sequence, document).
    docs: DashMap<String, (u64, Json)>,
    seq: AtomicU64,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> MemoryRepository<T> {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self {
            docs: DashMap::new(),
            seq: AtomicU64::new(0),
            _marker: PhantomData,
        }
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Matching `(id, document)` pairs in insertion order.
    fn matching(&self, filters: &[Filter]) -> Vec<(String, Json)> {
        let mut hits: Vec<(u64, String, Json)> = self
            .docs
            .iter()
            .filter(|entry| matcher::matches_all(&entry.value().1, filters))
            .map(|entry| {
                let (seq, doc) = entry.value();
                (*seq, entry.key().clone(), doc.clone())
            })
            .collect();
        hits.sort_by_key(|(seq, _, _)| *seq);
        hits.into_iter().map(|(_, id, doc)| (id, doc)).collect()
    }

    fn decode(doc: Json) -> Result<T, StoreError> {
        serde_json::from_value(doc).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn encode(doc: &T) -> Result<Json, StoreError> {
        serde_json::to_value(doc).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

impl<T: Document> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..24].to_owned()
}

#[async_trait]
impl<T: Document> Repository<T> for MemoryRepository<T> {
    async fn insert(&self, doc: T) -> Result<String, StoreError> {
        let id = new_id();
        let mut doc = doc;
        doc.set_id(id.clone());
        let json = Self::encode(&doc)?;
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.docs.insert(id.clone(), (seq, json));
        debug!(collection = T::COLLECTION, %id, "document inserted");
        Ok(id)
    }

    async fn find_one(&self, filters: &[Filter]) -> Result<Option<T>, StoreError> {
        self.matching(filters)
            .into_iter()
            .next()
            .map(|(_, doc)| Self::decode(doc))
            .transpose()
    }

    async fn find(&self, options: &QueryOptions) -> Result<Vec<T>, StoreError> {
        let mut docs: Vec<Json> = self
            .matching(&options.filters)
            .into_iter()
            .map(|(_, doc)| doc)
            .collect();

        if !options.sorts.is_empty() {
            docs.sort_by(|a, b| matcher::compare_docs(a, b, &options.sorts));
        }

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let limit = if options.limit == 0 {
            usize::MAX
        } else {
            usize::try_from(options.limit).unwrap_or(usize::MAX)
        };

        docs.into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| {
                if options.fields.is_empty() {
                    doc
                } else {
                    matcher::project(&doc, &options.fields, T::ID_FIELD)
                }
            })
            .map(Self::decode)
            .collect()
    }

    async fn update_one(&self, filters: &[Filter], doc: &T) -> Result<u64, StoreError> {
        let Some((id, _)) = self.matching(filters).into_iter().next() else {
            return Ok(0);
        };

        let mut replacement = doc.clone();
        replacement.set_id(id.clone());
        let json = Self::encode(&replacement)?;
        if let Some(mut entry) = self.docs.get_mut(&id) {
            entry.1 = json;
        }
        debug!(collection = T::COLLECTION, %id, "document replaced");
        Ok(1)
    }

    async fn update_fields(&self, filters: &[Filter], patch: &Patch) -> Result<u64, StoreError> {
        let mut matched = 0;
        for (id, _) in self.matching(filters) {
            if let Some(mut entry) = self.docs.get_mut(&id) {
                for (field, value) in patch.iter() {
                    matcher::assign(&mut entry.1, field, value.to_json());
                }
                matched += 1;
            }
        }
        debug!(collection = T::COLLECTION, matched, "documents patched");
        Ok(matched)
    }
}
