//! String-keyed persistent storage backends.
//!
//! The plan store only needs `get`/`set`/`remove` on string values, so the
//! backend is a trait. `FileStore` keeps one JSON file per key with file
//! locking and atomic replacement; `MemoryStore` is used by tests and dry
//! runs.

use crate::{Error, Result};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Key-value storage trait for persisting serialized blobs
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Directory-backed store: `<dir>/<key>.json`
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(&path)?;
        // Acquire shared lock for reading
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        tracing::debug!("Read {} bytes from {:?}", contents.len(), path);
        Ok(Some(contents))
    }

    /// Atomically writes the value by writing to a temp file in the same
    /// directory, syncing, then renaming over the original.
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);

        let temp = NamedTempFile::new_in(&self.dir)?;
        // Exclusive lock on the temp file serializes concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(value.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} to {:?}", key, path);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Removed {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
