use std::sync::Arc;

use inkwell_blob::{MemoryUploader, Uploader};
use inkwell_core::{BlogPost, Category, User};
use inkwell_store::Repository;
use inkwell_store_memory::MemoryRepository;
#[cfg(feature = "mongo")]
use inkwell_store_mongo::{MongoConfig, MongoStore};
#[cfg(feature = "postgres")]
use inkwell_store_postgres::{PostgresConfig, PostgresUserRepository};
use tracing::{info, warn};

use crate::config::{InkwellConfig, MongoSection, PostgresSection, StorageConfig};
use crate::error::ServerError;

/// Repositories and the uploader the services run on.
#[derive(Clone)]
pub struct Backends {
    pub posts: Arc<dyn Repository<BlogPost>>,
    pub categories: Arc<dyn Repository<Category>>,
    pub users: Arc<dyn Repository<User>>,
    pub uploader: Arc<dyn Uploader>,
}

impl Backends {
    /// Everything in process memory.
    pub fn in_memory() -> Self {
        Self {
            posts: Arc::new(MemoryRepository::<BlogPost>::new()),
            categories: Arc::new(MemoryRepository::<Category>::new()),
            users: Arc::new(MemoryRepository::<User>::new()),
            uploader: Arc::new(MemoryUploader::new()),
        }
    }
}

/// Connect every backend named in the configuration.
pub async fn create_backends(config: &InkwellConfig) -> Result<Backends, ServerError> {
    let (posts, categories) = create_document_repositories(&config.mongo).await?;
    let users = create_user_repository(&config.postgres).await?;
    let uploader = create_uploader(&config.storage).await?;
    Ok(Backends {
        posts,
        categories,
        users,
        uploader,
    })
}

type DocumentRepositories = (
    Arc<dyn Repository<BlogPost>>,
    Arc<dyn Repository<Category>>,
);

/// Create the post and category repositories.
#[allow(clippy::unused_async)]
pub async fn create_document_repositories(
    config: &MongoSection,
) -> Result<DocumentRepositories, ServerError> {
    let Some(uri) = config.uri.as_deref() else {
        warn!("no [mongo] uri configured, posts and categories are kept in memory");
        return Ok((
            Arc::new(MemoryRepository::<BlogPost>::new()),
            Arc::new(MemoryRepository::<Category>::new()),
        ));
    };

    #[cfg(feature = "mongo")]
    {
        let mongo_config = MongoConfig::new(uri, &config.database);
        let store = MongoStore::connect(&mongo_config)
            .await
            .map_err(|e| ServerError::Config(format!("mongo: {e}")))?;
        info!(database = %config.database, "document store connected");
        Ok((
            Arc::new(store.repository::<BlogPost>()),
            Arc::new(store.repository::<Category>()),
        ))
    }
    #[cfg(not(feature = "mongo"))]
    {
        let _ = uri;
        Err(ServerError::Config(
            "[mongo] uri is set but the server was built without the `mongo` feature".into(),
        ))
    }
}

/// Create the account repository.
#[allow(clippy::unused_async)]
pub async fn create_user_repository(
    config: &PostgresSection,
) -> Result<Arc<dyn Repository<User>>, ServerError> {
    let Some(url) = config.url.as_deref() else {
        warn!("no [postgres] url configured, accounts are kept in memory");
        return Ok(Arc::new(MemoryRepository::<User>::new()));
    };

    #[cfg(feature = "postgres")]
    {
        let repo = PostgresUserRepository::new(&postgres_config(config, url))
            .await
            .map_err(|e| ServerError::Config(format!("postgres: {e}")))?;
        info!("relational store connected");
        Ok(Arc::new(repo))
    }
    #[cfg(not(feature = "postgres"))]
    {
        let _ = url;
        Err(ServerError::Config(
            "[postgres] url is set but the server was built without the `postgres` feature"
                .into(),
        ))
    }
}

#[cfg(feature = "postgres")]
pub fn postgres_config(config: &PostgresSection, url: &str) -> PostgresConfig {
    PostgresConfig {
        url: url.to_owned(),
        pool_size: config.pool_size,
        table_prefix: config.table_prefix.clone(),
    }
}

/// Create the media uploader.
#[allow(clippy::unused_async)]
pub async fn create_uploader(config: &StorageConfig) -> Result<Arc<dyn Uploader>, ServerError> {
    let uploader: Arc<dyn Uploader> = match config.backend.as_str() {
        "memory" => {
            warn!("media storage backend is memory, uploads are lost on restart");
            Arc::new(MemoryUploader::new())
        }
        #[cfg(feature = "s3")]
        "s3" => {
            let bucket = config.bucket.as_deref().ok_or_else(|| {
                ServerError::Config("s3 storage backend requires [storage] bucket".into())
            })?;

            let mut s3_config = inkwell_aws::S3Config::new(&config.region, bucket);
            if let Some(endpoint) = &config.endpoint_url {
                s3_config = s3_config.with_endpoint_url(endpoint);
            }
            if let Some(prefix) = &config.prefix {
                s3_config = s3_config.with_prefix(prefix);
            }

            let uploader = inkwell_aws::S3Uploader::new(s3_config).await;
            if let Err(e) = uploader.health_check().await {
                warn!(error = %e, bucket, "media bucket is not reachable yet");
            }
            info!(bucket, "s3 media storage configured");
            Arc::new(uploader)
        }
        other => {
            return Err(ServerError::Config(format!(
                "unsupported storage backend: {other}"
            )));
        }
    };
    Ok(uploader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unset_stores_fall_back_to_memory() {
        let config = InkwellConfig::from_toml("").unwrap();
        let backends = create_backends(&config).await.unwrap();
        backends.posts.ping().await.unwrap();
        backends.users.ping().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_storage_backend_is_rejected() {
        let config = InkwellConfig::from_toml("[storage]\nbackend = \"ftp\"").unwrap();
        let Err(err) = create_uploader(&config.storage).await else {
            panic!("expected a configuration error");
        };
        assert!(matches!(err, ServerError::Config(ref m) if m.contains("ftp")));
    }

    #[cfg(feature = "s3")]
    #[tokio::test]
    async fn s3_backend_requires_a_bucket() {
        let config = InkwellConfig::from_toml("[storage]\nbackend = \"s3\"").unwrap();
        let Err(err) = create_uploader(&config.storage).await else {
            panic!("expected a configuration error");
        };
        assert!(matches!(err, ServerError::Config(ref m) if m.contains("bucket")));
    }
}
