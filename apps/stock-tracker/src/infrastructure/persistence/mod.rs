//! Blob store adapters.

mod file;
mod in_memory;

pub use file::FileBlobStore;
pub use in_memory::InMemoryBlobStore;
