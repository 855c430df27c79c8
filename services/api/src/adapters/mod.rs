pub mod kv;
pub mod library_store;
pub mod records;

pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
pub use library_store::{KvLibraryStore, ACTIVITY_LOG_KEY, CATALOG_KEY};
