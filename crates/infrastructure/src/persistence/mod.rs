//! Key/value storage backends for the credential store.

mod file_storage;
mod memory_storage;

pub use file_storage::FileStorage;
pub use memory_storage::{MemoryStorage, NullStorage};
