use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use inkwell_core::{Category, CreateCategoryRequest, UpdateCategoryRequest};

use super::AppState;
use super::query::{FilterParams, ListParams, filter_tokens, list_query};
use super::schemas::{CategoryList, CreatedResponse, ErrorResponse, ListResponse, MatchedResponse};
use crate::error::ServerError;

/// `POST /v1/categories`
#[utoipa::path(
    post,
    path = "/v1/categories",
    tag = "Categories",
    summary = "Create a category",
    request_body(content = CreateCategoryRequest, description = "Category definition"),
    responses(
        (status = 201, description = "Category created", body = CreatedResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let id = state.categories.create(req).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// `GET /v1/categories`
#[utoipa::path(
    get,
    path = "/v1/categories",
    tag = "Categories",
    summary = "Query categories",
    description = "Filters, sorts, projects and paginates categories. Newest first unless a sort is given.",
    params(ListParams),
    responses(
        (status = 200, description = "A page of categories", body = CategoryList),
        (status = 400, description = "Malformed query", body = ErrorResponse),
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse, ServerError> {
    let query = list_query(raw.as_deref())?;
    let categories = state.categories.find(&query).await?;
    Ok(Json(ListResponse::new(categories, query.pagination)))
}

/// `GET /v1/categories/all`
#[utoipa::path(
    get,
    path = "/v1/categories/all",
    tag = "Categories",
    summary = "List every category",
    description = "Returns every category sorted by name. Public.",
    responses(
        (status = 200, description = "Every category", body = Vec<Category>),
    )
)]
pub async fn all_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
    Ok(Json(state.categories.find_all().await?))
}

/// `PUT /v1/categories?filter=...`
#[utoipa::path(
    put,
    path = "/v1/categories",
    tag = "Categories",
    summary = "Update categories",
    description = "Sets name and description on every category matching the filters.",
    params(FilterParams),
    request_body(content = UpdateCategoryRequest, description = "New name and description"),
    responses(
        (status = 200, description = "Categories updated", body = MatchedResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "No matching category", body = ErrorResponse),
    )
)]
pub async fn update_categories(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, ServerError> {
    let filters = filter_tokens(raw.as_deref())?;
    let matched = state.categories.update(&filters, req).await?;
    Ok(Json(MatchedResponse { matched }))
}
