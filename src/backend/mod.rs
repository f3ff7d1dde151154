mod interface;
mod json_store;
mod memory_store;
pub mod record;

pub use interface::{KeyValueStore, Result, BackendError};
pub use json_store::JsonStore;
#[cfg(test)]
pub(crate) use json_store::temp_path;
pub use memory_store::MemoryStore;
