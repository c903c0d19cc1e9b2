use chrono::{DateTime, Duration, Utc};
use inkwell_query::{FieldKind, FieldTypes, Filter, Operator, Patch, QueryOptions, Sort, Value};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::StoreError;
use crate::repository::Repository;

/// Document type exercised by the conformance suite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConformanceDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub rank: i64,
    pub tag: String,
    pub created_at: DateTime<Utc>,
}

impl Document for ConformanceDoc {
    const COLLECTION: &'static str = "conformance_docs";
    const ID_FIELD: &'static str = "_id";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn field_types() -> FieldTypes {
        FieldTypes::new()
            .with_field("name", FieldKind::String)
            .with_field("tag", FieldKind::String)
            .with_field("rank", FieldKind::Integer)
            .with_field("created_at", FieldKind::Timestamp)
    }
}

fn doc(name: &str, rank: i64, tag: &str, created_at: DateTime<Utc>) -> ConformanceDoc {
    ConformanceDoc {
        id: None,
        name: name.to_owned(),
        rank,
        tag: tag.to_owned(),
        created_at,
    }
}

/// Run the full repository conformance test suite.
///
/// Call this from your backend's test module. Each check tags its documents
/// uniquely, so the repository does not need to be empty.
///
/// # Errors
///
/// Returns an error if a repository call fails; assertion failures panic.
pub async fn run_repository_conformance_tests(
    repo: &dyn Repository<ConformanceDoc>,
) -> Result<(), StoreError> {
    let run = Utc::now().timestamp_micros();
    test_insert_assigns_id(repo, run).await?;
    test_find_one_missing(repo, run).await?;
    test_find_filters(repo, run).await?;
    test_sort_and_paginate(repo, run).await?;
    test_projection(repo, run).await?;
    test_timestamp_filter(repo, run).await?;
    test_update_one(repo, run).await?;
    test_update_fields(repo, run).await?;
    Ok(())
}

async fn seed(
    repo: &dyn Repository<ConformanceDoc>,
    tag: &str,
    count: i64,
) -> Result<Vec<String>, StoreError> {
    let base = Utc::now();
    let mut ids = Vec::new();
    for rank in 1..=count {
        let created = base + Duration::seconds(rank);
        ids.push(
            repo.insert(doc(&format!("{tag}-{rank}"), rank, tag, created))
                .await?,
        );
    }
    Ok(ids)
}

fn tagged(tag: &str) -> Filter {
    Filter::eq("tag", tag)
}

async fn test_insert_assigns_id(
    repo: &dyn Repository<ConformanceDoc>,
    run: i64,
) -> Result<(), StoreError> {
    let tag = format!("insert-{run}");
    let id = repo.insert(doc("first", 1, &tag, Utc::now())).await?;
    assert!(!id.is_empty(), "insert should return a non-empty id");

    let found = repo
        .find_one(&[Filter::eq(
            ConformanceDoc::ID_FIELD,
            Value::Identifier(id.clone()),
        )])
        .await?
        .ok_or_else(|| StoreError::Storage("inserted document not found by id".to_owned()))?;
    assert_eq!(found.id.as_deref(), Some(id.as_str()));
    assert_eq!(found.name, "first");
    assert_eq!(found.tag, tag);
    Ok(())
}

async fn test_find_one_missing(
    repo: &dyn Repository<ConformanceDoc>,
    run: i64,
) -> Result<(), StoreError> {
    let found = repo
        .find_one(&[tagged(&format!("missing-{run}"))])
        .await?;
    assert!(found.is_none(), "find_one with no match should return None");
    Ok(())
}

async fn test_find_filters(
    repo: &dyn Repository<ConformanceDoc>,
    run: i64,
) -> Result<(), StoreError> {
    let tag = format!("filter-{run}");
    seed(repo, &tag, 5).await?;

    let opts = QueryOptions::new()
        .with_filter(tagged(&tag))
        .with_filter(Filter::new("rank", Operator::Gt, 2_i64));
    let mut ranks: Vec<i64> = repo.find(&opts).await?.iter().map(|d| d.rank).collect();
    ranks.sort_unstable();
    assert_eq!(ranks, vec![3, 4, 5]);

    let opts = QueryOptions::new()
        .with_filter(tagged(&tag))
        .with_filter(Filter::new("rank", Operator::Ne, 3_i64))
        .with_filter(Filter::new("rank", Operator::Lte, 4_i64));
    let mut ranks: Vec<i64> = repo.find(&opts).await?.iter().map(|d| d.rank).collect();
    ranks.sort_unstable();
    assert_eq!(ranks, vec![1, 2, 4]);
    Ok(())
}

async fn test_sort_and_paginate(
    repo: &dyn Repository<ConformanceDoc>,
    run: i64,
) -> Result<(), StoreError> {
    let tag = format!("page-{run}");
    seed(repo, &tag, 5).await?;

    let opts = QueryOptions::new()
        .with_filter(tagged(&tag))
        .with_sorts(vec![Sort::desc("rank")])
        .with_skip(1)
        .with_limit(2);
    let ranks: Vec<i64> = repo.find(&opts).await?.iter().map(|d| d.rank).collect();
    assert_eq!(ranks, vec![4, 3]);

    let opts = QueryOptions::new()
        .with_filter(tagged(&tag))
        .with_sorts(vec![Sort::asc("rank")]);
    let ranks: Vec<i64> = repo.find(&opts).await?.iter().map(|d| d.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4, 5], "limit 0 should be unbounded");
    Ok(())
}

async fn test_projection(
    repo: &dyn Repository<ConformanceDoc>,
    run: i64,
) -> Result<(), StoreError> {
    let tag = format!("project-{run}");
    seed(repo, &tag, 1).await?;

    let opts = QueryOptions::new()
        .with_filter(tagged(&tag))
        .with_fields(vec!["name".to_owned()]);
    let docs = repo.find(&opts).await?;
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].name, format!("{tag}-1"));
    assert_eq!(docs[0].rank, 0, "unprojected fields should be defaulted");
    assert!(docs[0].id.is_some(), "the id is always projected");
    Ok(())
}

async fn test_timestamp_filter(
    repo: &dyn Repository<ConformanceDoc>,
    run: i64,
) -> Result<(), StoreError> {
    let tag = format!("time-{run}");
    let base = Utc::now() - Duration::days(30);
    for (rank, days) in [(1, 0), (2, 10), (3, 20)] {
        repo.insert(doc("t", rank, &tag, base + Duration::days(days)))
            .await?;
    }

    let opts = QueryOptions::new()
        .with_filter(tagged(&tag))
        .with_filter(Filter::new(
            "created_at",
            Operator::Gte,
            base + Duration::days(5),
        ))
        .with_sorts(vec![Sort::asc("created_at")]);
    let ranks: Vec<i64> = repo.find(&opts).await?.iter().map(|d| d.rank).collect();
    assert_eq!(ranks, vec![2, 3]);
    Ok(())
}

async fn test_update_one(
    repo: &dyn Repository<ConformanceDoc>,
    run: i64,
) -> Result<(), StoreError> {
    let tag = format!("update-one-{run}");
    let ids = seed(repo, &tag, 1).await?;
    let by_id = [Filter::eq(
        ConformanceDoc::ID_FIELD,
        Value::Identifier(ids[0].clone()),
    )];

    let mut replacement = doc("renamed", 42, &tag, Utc::now());
    replacement.id = Some("ignored".to_owned());
    let matched = repo.update_one(&by_id, &replacement).await?;
    assert_eq!(matched, 1);

    let found = repo
        .find_one(&by_id)
        .await?
        .ok_or_else(|| StoreError::Storage("updated document not found by id".to_owned()))?;
    assert_eq!(found.id.as_deref(), Some(ids[0].as_str()));
    assert_eq!(found.name, "renamed");
    assert_eq!(found.rank, 42);

    let matched = repo
        .update_one(&[tagged(&format!("nothing-{run}"))], &replacement)
        .await?;
    assert_eq!(matched, 0);
    Ok(())
}

async fn test_update_fields(
    repo: &dyn Repository<ConformanceDoc>,
    run: i64,
) -> Result<(), StoreError> {
    let tag = format!("update-fields-{run}");
    let moved = format!("moved-{run}");
    seed(repo, &tag, 4).await?;

    let patch = Patch::new().set("tag", moved.as_str()).set("name", "patched");
    let matched = repo
        .update_fields(
            &[tagged(&tag), Filter::new("rank", Operator::Gte, 3_i64)],
            &patch,
        )
        .await?;
    assert_eq!(matched, 2);

    let docs = repo
        .find(&QueryOptions::new().with_filter(tagged(&moved)))
        .await?;
    assert_eq!(docs.len(), 2);
    assert!(docs.iter().all(|d| d.name == "patched"));

    let remaining = repo
        .find(&QueryOptions::new().with_filter(tagged(&tag)))
        .await?;
    assert_eq!(remaining.len(), 2, "unmatched documents are untouched");
    Ok(())
}
