#![allow(clippy::needless_for_each)]

use inkwell_core::{
    AccountStatus, Block, BlockContent, BlockKind, BlogPost, Category, ChangePasswordRequest,
    CreateBlockRequest, CreateBlogPostRequest, CreateCategoryRequest, CreateFormatRequest,
    CreateParagraphRequest, Format, FormatKind, HeadingBlock, HeadingRange, LoginRequest,
    MediaBlock, Paragraph, PostStatus, RegisterUserRequest, Role, TextBlock,
    UpdateCategoryRequest, UpdateUserRequest, UserProfile,
};

use super::schemas::{
    AvatarForm, CreatedResponse, ErrorResponse, HealthResponse, LoginResponse, MatchedResponse,
    MessageResponse, PageMeta, PostForm, StoreHealth,
};

#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "Inkwell API",
        version = "0.1.0",
        description = "HTTP API for the Inkwell blogging backend. Manage accounts, categories and block-structured posts with a filter/sort/projection query language.",
        license(name = "Apache-2.0")
    ),
    tags(
        (name = "Health", description = "Service and store health"),
        (name = "Users", description = "Registration, sign-in and account management"),
        (name = "Posts", description = "Block-structured blog posts with media uploads"),
        (name = "Categories", description = "Post categories and access tiers"),
    ),
    paths(
        super::health::health,
        super::users::register,
        super::users::login,
        super::users::change_password,
        super::users::get_user,
        super::users::update_user,
        super::users::update_avatar,
        super::users::delete_user,
        super::users::list_users,
        super::posts::create_post,
        super::posts::list_posts,
        super::posts::all_posts,
        super::posts::update_posts,
        super::posts::delete_posts,
        super::categories::create_category,
        super::categories::list_categories,
        super::categories::all_categories,
        super::categories::update_categories,
    ),
    components(schemas(
        ErrorResponse, HealthResponse, StoreHealth, LoginResponse, CreatedResponse,
        MatchedResponse, MessageResponse, PageMeta, PostForm, AvatarForm,
        BlogPost, Block, BlockContent, BlockKind, TextBlock, Paragraph, Format, FormatKind,
        HeadingRange, MediaBlock, HeadingBlock, PostStatus,
        Category, Role, AccountStatus, UserProfile,
        CreateBlogPostRequest, CreateBlockRequest, CreateParagraphRequest, CreateFormatRequest,
        CreateCategoryRequest, UpdateCategoryRequest,
        RegisterUserRequest, LoginRequest, ChangePasswordRequest, UpdateUserRequest,
    ))
)]
pub struct ApiDoc;
