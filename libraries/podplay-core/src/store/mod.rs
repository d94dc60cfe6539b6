//! Key-value store adapters and the persisted key layout

mod directory;
pub mod keys;
mod memory;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;
