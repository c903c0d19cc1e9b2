use std::sync::Arc;

use chrono::Utc;
use inkwell_core::{Category, ContentError, CreateCategoryRequest, UpdateCategoryRequest};
use inkwell_query::{Patch, QueryOptions, Sort, parse_filters_with};
use inkwell_store::Repository;
use tracing::{info, instrument};

use crate::error::ServiceError;
use crate::query::RawQuery;

pub struct CategoryService {
    repo: Arc<dyn Repository<Category>>,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn Repository<Category>>) -> Self {
        Self { repo }
    }

    #[instrument(skip_all, fields(name = %request.name))]
    pub async fn create(&self, request: CreateCategoryRequest) -> Result<String, ServiceError> {
        let now = Utc::now();
        let category = Category {
            id: None,
            name: request.name,
            description: request.description,
            access: request.access,
            created_at: now,
            updated_at: now,
        };
        category.validate()?;

        let id = self.repo.insert(category).await?;
        info!(category_id = %id, "category created");
        Ok(id)
    }

    /// Run a raw list query. Defaults to newest first; ties always break on
    /// the identifier, newest first.
    #[instrument(skip_all)]
    pub async fn find(&self, query: &RawQuery) -> Result<Vec<Category>, ServiceError> {
        let mut options = query
            .parse(&Category::field_types())?
            .with_default_sort(vec![Sort::desc("created_at")]);
        options.rename_field("id", "_id");
        options.sorts.push(Sort::desc("_id"));

        Ok(self.repo.find(&options).await?)
    }

    /// Every category, by name.
    #[instrument(skip_all)]
    pub async fn find_all(&self) -> Result<Vec<Category>, ServiceError> {
        let options = QueryOptions::new().with_sorts(vec![Sort::asc("name")]);
        Ok(self.repo.find(&options).await?)
    }

    /// Set name and description on every category matching `raw_filters`.
    #[instrument(skip_all)]
    pub async fn update(
        &self,
        raw_filters: &[String],
        request: UpdateCategoryRequest,
    ) -> Result<u64, ServiceError> {
        if raw_filters.is_empty() {
            return Err(ServiceError::Validation(
                "at least one filter is required".into(),
            ));
        }
        if request.name.trim().is_empty() {
            return Err(ContentError::EmptyName.into());
        }

        let mut options = QueryOptions::new()
            .with_filters(parse_filters_with(raw_filters, &Category::field_types())?);
        options.rename_field("id", "_id");

        let patch = Patch::new()
            .set("name", request.name)
            .set("description", request.description)
            .set("updated_at", Utc::now());
        let matched = self.repo.update_fields(&options.filters, &patch).await?;
        if matched == 0 {
            return Err(ServiceError::NotFound("category not found".into()));
        }
        info!(matched, "categories updated");
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use inkwell_core::Role;
    use inkwell_store_memory::MemoryRepository;

    use super::*;

    fn service() -> CategoryService {
        CategoryService::new(Arc::new(MemoryRepository::<Category>::new()))
    }

    fn named(name: &str) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: name.into(),
            description: format!("All about {name}"),
            access: vec![Role::Basic],
        }
    }

    #[tokio::test]
    async fn create_requires_a_name() {
        let err = service().create(named(" ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "category name cannot be empty"));
    }

    #[tokio::test]
    async fn find_all_sorts_by_name() {
        let service = service();
        for name in ["Rust", "Go", "Zig"] {
            service.create(named(name)).await.unwrap();
        }
        let names: Vec<String> = service
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Go", "Rust", "Zig"]);
    }

    #[tokio::test]
    async fn find_filters_and_projects() {
        let service = service();
        service.create(named("Rust")).await.unwrap();
        service.create(named("Go")).await.unwrap();

        let found = service
            .find(
                &RawQuery::new()
                    .with_filter("name__==__Rust")
                    .with_fields("name"),
            )
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Rust");
        assert!(found[0].description.is_empty());
        assert!(found[0].id.is_some());
    }

    #[tokio::test]
    async fn update_patches_name_and_description() {
        let service = service();
        let id = service.create(named("Rust")).await.unwrap();

        let matched = service
            .update(
                &[format!("id__==__{id}")],
                UpdateCategoryRequest {
                    name: "Rustlang".into(),
                    description: "Systems".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(matched, 1);

        let category = &service.find_all().await.unwrap()[0];
        assert_eq!(category.name, "Rustlang");
        assert_eq!(category.description, "Systems");
        assert_eq!(category.access, vec![Role::Basic]);
        assert!(category.updated_at >= category.created_at);
    }

    #[tokio::test]
    async fn update_rejects_empty_name_and_unknown_ids() {
        let service = service();
        let err = service
            .update(
                &["name__==__Rust".to_owned()],
                UpdateCategoryRequest::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = service
            .update(
                &["name__==__Missing".to_owned()],
                UpdateCategoryRequest {
                    name: "X".into(),
                    description: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
