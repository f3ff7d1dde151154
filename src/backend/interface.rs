use std::collections::HashSet;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage file is malformed: {0}")]
    Serialization(#[from] serde_json::Error)
}

pub type Result<T> = std::result::Result<T, BackendError>;

/// Named scalars and string sets, the two shapes the ledger persists.
///
/// Sets carry no ordering guarantee: whatever order `put_set` saw
/// is not what `get_set` hands back.
pub trait KeyValueStore {
    fn get_scalar(&self, key: &str) -> Result<Option<f64>>;
    fn put_scalar(&self, key: &str, value: f64) -> Result<()>;
    fn get_set(&self, key: &str) -> Result<Option<HashSet<String>>>;
    fn put_set(&self, key: &str, values: HashSet<String>) -> Result<()>;
}

/// Lets a ledger borrow a store that outlives it.
impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get_scalar(&self, key: &str) -> Result<Option<f64>> {
        (**self).get_scalar(key)
    }

    fn put_scalar(&self, key: &str, value: f64) -> Result<()> {
        (**self).put_scalar(key, value)
    }

    fn get_set(&self, key: &str) -> Result<Option<HashSet<String>>> {
        (**self).get_set(key)
    }

    fn put_set(&self, key: &str, values: HashSet<String>) -> Result<()> {
        (**self).put_set(key, values)
    }
}
