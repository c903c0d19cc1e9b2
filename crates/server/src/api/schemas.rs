use inkwell_core::{BlogPost, Category, Role, UserProfile};
use inkwell_query::Pagination;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    #[schema(example = "invalid filter format: title")]
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` when every store answered, `degraded` otherwise.
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    pub stores: Vec<StoreHealth>,
}

/// Reachability of a single store.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoreHealth {
    #[schema(example = "posts")]
    pub name: String,
    pub ok: bool,
}

/// Response to a successful sign-in.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Session token, also set as the `inkwell_token` cookie.
    pub token: String,
    /// Token lifetime in seconds.
    #[schema(example = 259_200)]
    pub expires_in: u64,
    #[schema(example = "42")]
    pub user_id: String,
    pub role: Role,
}

/// Identifier of a newly created resource.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    #[schema(example = "65f1c0ffee0000000000beef")]
    pub id: String,
}

/// Number of resources a write matched.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MatchedResponse {
    #[schema(example = 1)]
    pub matched: u64,
}

/// Acknowledgement without a payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "password changed")]
    pub message: String,
}

/// Page description attached to every list response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PageMeta {
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub page_size: u64,
    /// Number of items in `data`.
    #[schema(example = 3)]
    pub count: usize,
}

impl PageMeta {
    pub fn new(pagination: Pagination, count: usize) -> Self {
        Self {
            page: pagination.page,
            page_size: pagination.page_size,
            count,
        }
    }
}

/// A page of results.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T: ToSchema> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T: ToSchema> ListResponse<T> {
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        let meta = PageMeta::new(pagination, data.len());
        Self { data, meta }
    }
}

pub type PostList = ListResponse<BlogPost>;
pub type CategoryList = ListResponse<Category>;
pub type UserList = ListResponse<UserProfile>;

/// Multipart body for creating or replacing a post.
///
/// `metadata` is a JSON-encoded [`CreateBlogPostRequest`](inkwell_core::CreateBlogPostRequest);
/// every image or video block at index `i` needs a `block_{i}_file` part.
#[derive(Debug, ToSchema)]
pub struct PostForm {
    #[schema(example = r#"{"title":"Hello","blocks":[{"type":"image","filename":"cat.png"}]}"#)]
    pub metadata: String,
    #[schema(value_type = Option<String>, format = Binary)]
    pub block_0_file: Option<Vec<u8>>,
}

/// Multipart body for an avatar upload.
#[derive(Debug, ToSchema)]
pub struct AvatarForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
