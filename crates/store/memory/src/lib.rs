pub mod matcher;
pub mod repository;

pub use repository::MemoryRepository;
