use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};

use crate::backend::interface::{KeyValueStore, Result};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    scalars: BTreeMap<String, f64>,
    #[serde(default)]
    sets: BTreeMap<String, BTreeSet<String>>
}

/// Key-value store kept in a single JSON file.
///
/// Every call opens the file, so nothing is cached between calls
/// and concurrent writers simply overwrite each other.
pub struct JsonStore {
    path: PathBuf
}

impl JsonStore {
    pub fn new(path: impl AsRef<Path>) -> JsonStore {
        JsonStore { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<StoreFile> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(StoreFile::default()),
            Err(err) => return Err(err.into())
        };
        if content.trim().is_empty() {
            return Ok(StoreFile::default());
        }
        return Ok(serde_json::from_str(&content)?);
    }

    fn write_file(&self, file: &StoreFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, content)?;
        return Ok(());
    }

    fn modify(&self, change: impl FnOnce(&mut StoreFile)) -> Result<()> {
        let mut file = self.read_file()?;
        change(&mut file);
        self.write_file(&file)
    }
}

impl KeyValueStore for JsonStore {
    fn get_scalar(&self, key: &str) -> Result<Option<f64>> {
        Ok(self.read_file()?.scalars.get(key).copied())
    }

    fn put_scalar(&self, key: &str, value: f64) -> Result<()> {
        self.modify(|file| { file.scalars.insert(key.to_owned(), value); })
    }

    fn get_set(&self, key: &str) -> Result<Option<HashSet<String>>> {
        Ok(self.read_file()?.sets.remove(key)
            .map(|values| values.into_iter().collect()))
    }

    fn put_set(&self, key: &str, values: HashSet<String>) -> Result<()> {
        self.modify(|file| { file.sets.insert(key.to_owned(), values.into_iter().collect()); })
    }
}

/// Scratch store file under the system temp dir, removed on drop.
#[cfg(test)]
pub(crate) struct TempPath(pub PathBuf);

#[cfg(test)]
impl Drop for TempPath {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

#[cfg(test)]
pub(crate) fn temp_path(name: &str) -> TempPath {
    let file_name = format!("banka-{}-{}-{:?}.json",
        name, std::process::id(), std::thread::current().id());
    let path = std::env::temp_dir().join(file_name);
    let _ = fs::remove_file(&path);
    TempPath(path)
}
