use axum::extract::{Multipart, RawQuery, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use inkwell_core::BlogPost;
use inkwell_service::Actor;

use super::AppState;
use super::multipart::read_post_form;
use super::query::{FilterParams, ListParams, filter_tokens, list_query};
use super::schemas::{
    CreatedResponse, ErrorResponse, ListResponse, MatchedResponse, MessageResponse, PostForm,
    PostList,
};
use crate::error::ServerError;

/// `POST /v1/blog/posts`
#[utoipa::path(
    post,
    path = "/v1/blog/posts",
    tag = "Posts",
    summary = "Create a post",
    description = "Assembles a post from the `metadata` part, uploads every media block from its `block_{i}_file` part and stores the post as active.",
    request_body(content = PostForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Post created", body = CreatedResponse),
        (status = 400, description = "Invalid post", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 500, description = "Upload or store failure", body = ErrorResponse),
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServerError> {
    let (request, files) = read_post_form(multipart).await?;
    let id = state.blog.create(&actor, request, &files).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// `GET /v1/blog/posts`
#[utoipa::path(
    get,
    path = "/v1/blog/posts",
    tag = "Posts",
    summary = "Query posts",
    description = "Filters, sorts, projects and paginates posts. Newest first unless a sort is given. Media blocks carry presigned links.",
    params(ListParams),
    responses(
        (status = 200, description = "A page of posts", body = PostList),
        (status = 400, description = "Malformed query", body = ErrorResponse),
    )
)]
pub async fn list_posts(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse, ServerError> {
    let query = list_query(raw.as_deref())?;
    let posts = state.blog.find(&query).await?;
    Ok(Json(ListResponse::new(posts, query.pagination)))
}

/// `GET /v1/blog/posts/all`
#[utoipa::path(
    get,
    path = "/v1/blog/posts/all",
    tag = "Posts",
    summary = "List every post",
    description = "Returns every post, newest first, with presigned media links.",
    responses(
        (status = 200, description = "Every post", body = Vec<BlogPost>),
    )
)]
pub async fn all_posts(State(state): State<AppState>) -> Result<impl IntoResponse, ServerError> {
    Ok(Json(state.blog.find_all().await?))
}

/// `PUT /v1/blog/posts?filter=...`
#[utoipa::path(
    put,
    path = "/v1/blog/posts",
    tag = "Posts",
    summary = "Replace a post",
    description = "Reassembles the first post matching the filters from a new form. Authors may only replace their own posts; admins any.",
    params(FilterParams),
    request_body(content = PostForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Post replaced", body = MessageResponse),
        (status = 400, description = "Invalid post or filter", body = ErrorResponse),
        (status = 404, description = "No matching post", body = ErrorResponse),
    )
)]
pub async fn update_posts(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    RawQuery(raw): RawQuery,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServerError> {
    let filters = filter_tokens(raw.as_deref())?;
    let (request, files) = read_post_form(multipart).await?;
    state.blog.update(&actor, &filters, request, &files).await?;
    Ok(Json(MessageResponse {
        message: "post updated".into(),
    }))
}

/// `DELETE /v1/blog/posts?filter=...`
#[utoipa::path(
    delete,
    path = "/v1/blog/posts",
    tag = "Posts",
    summary = "Delete posts",
    description = "Marks every post matching the filters as deleted. Nothing is removed.",
    params(FilterParams),
    responses(
        (status = 200, description = "Posts marked deleted", body = MatchedResponse),
        (status = 400, description = "Missing or malformed filter", body = ErrorResponse),
        (status = 404, description = "No matching post", body = ErrorResponse),
    )
)]
pub async fn delete_posts(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse, ServerError> {
    let filters = filter_tokens(raw.as_deref())?;
    let matched = state.blog.soft_delete(&actor, &filters).await?;
    Ok(Json(MatchedResponse { matched }))
}
