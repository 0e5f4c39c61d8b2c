//! Semantic cache store implementations

mod file;
mod in_memory;

pub use file::FileSemanticCache;
pub use in_memory::InMemorySemanticCache;
