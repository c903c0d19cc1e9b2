//! Application services for Inkwell.
//!
//! Services sit between the HTTP layer and the repositories: they parse raw
//! query tokens, assemble posts from block requests (uploading media through
//! an [`Uploader`](inkwell_blob::Uploader)), enrich media blocks with
//! presigned links on read and apply the account rules for users.

pub mod actor;
pub mod assembler;
pub mod blog;
pub mod category;
pub mod error;
pub mod links;
pub mod password;
pub mod query;
pub mod user;

pub use actor::Actor;
pub use assembler::{FileParts, assemble_blog_post};
pub use blog::BlogService;
pub use category::CategoryService;
pub use error::ServiceError;
pub use links::{DEFAULT_LINK_TTL, attach_links};
pub use query::RawQuery;
pub use user::UserService;
