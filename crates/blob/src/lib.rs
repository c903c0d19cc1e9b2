pub mod error;
pub mod media;
pub mod memory;
pub mod uploader;

pub use error::BlobError;
pub use media::{MediaKind, object_key};
pub use memory::{MemoryUploader, UploadRecord};
pub use uploader::Uploader;
