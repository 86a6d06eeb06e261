//! Storage seam shared by every repository trait.

mod memory;

pub use memory::MemoryStore;

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0} already exists")]
    Conflict(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
