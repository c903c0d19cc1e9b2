//! Core entities and the block content model for Inkwell.
//!
//! A [`BlogPost`] is an ordered sequence of [`Block`]s. Each block carries
//! exactly one payload ([`BlockContent`]): rich text made of paragraphs with
//! inline format ranges, an image, a video, or a heading.

pub mod block;
pub mod category;
pub mod error;
pub mod post;
pub mod request;
pub mod role;
pub mod status;
pub mod user;

pub use block::{
    Block, BlockContent, BlockKind, Format, FormatKind, HeadingBlock, HeadingRange, MediaBlock,
    Paragraph, TextBlock,
};
pub use category::Category;
pub use error::ContentError;
pub use post::BlogPost;
pub use request::{
    ChangePasswordRequest, CreateBlockRequest, CreateBlogPostRequest, CreateCategoryRequest,
    CreateFormatRequest, CreateParagraphRequest, LoginRequest, RegisterUserRequest,
    UpdateCategoryRequest, UpdateUserRequest,
};
pub use role::Role;
pub use status::{AccountStatus, PostStatus};
pub use user::{User, UserProfile};
