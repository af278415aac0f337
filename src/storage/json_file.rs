use super::KeyValueStore;
use anyhow::{bail, Context, Result};
use std::{
    collections::BTreeMap,
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

const DEFAULT_FILE_NAME: &str = "accounts_store.json";

type Dump = BTreeMap<String, String>;

/// Keeps every entry in a single JSON object on disk.
///
/// The file is re-read on every access so that edits made by another process
/// between two calls are observed. Writes go through a temporary file in the
/// same directory and are renamed over the target, so a crash mid-write never
/// leaves a truncated document behind. Two processes writing concurrently are
/// still last-writer-wins.
pub struct JsonFileKeyValueStore {
    file_path: PathBuf,
    write_lock: Mutex<()>,
}

fn parent_dir(file_path: &Path) -> &Path {
    match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

impl JsonFileKeyValueStore {
    pub fn new<T: AsRef<Path>>(file_path: T) -> Result<Self> {
        let file_path = file_path.as_ref().to_path_buf();
        if !parent_dir(&file_path).is_dir() {
            bail!(
                "Cannot use {:?} as store file, its directory does not exist",
                file_path
            );
        }
        if file_path.is_dir() {
            bail!("Store file path {:?} is a directory", file_path);
        }
        Ok(JsonFileKeyValueStore {
            file_path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Walks up from the current directory looking for an existing store file.
    pub fn infer_path() -> Option<PathBuf> {
        let mut current_dir = std::env::current_dir().ok()?;

        loop {
            let candidate = current_dir.join(DEFAULT_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }

            if let Some(parent) = current_dir.parent() {
                current_dir = parent.to_path_buf();
            } else {
                break;
            }
        }

        None
    }

    fn load_dump(&self) -> Result<Dump> {
        let content = match fs::read_to_string(&self.file_path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Dump::new()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read store file {:?}", self.file_path))
            }
        };

        match serde_json::from_str(&content) {
            Ok(dump) => Ok(dump),
            Err(err) => {
                warn!(
                    "Store file {:?} is malformed, treating it as empty: {}",
                    self.file_path, err
                );
                Ok(Dump::new())
            }
        }
    }

    fn save_dump(&self, dump: &Dump) -> Result<()> {
        let json_string = serde_json::to_string_pretty(dump)?;
        let mut file = NamedTempFile::new_in(parent_dir(&self.file_path))
            .context("Failed to create temporary store file")?;
        file.write_all(json_string.as_bytes())?;
        file.persist(&self.file_path)
            .map_err(|err| err.error)
            .with_context(|| format!("Failed to write store file {:?}", self.file_path))?;
        debug!("Saved {} entries to {:?}", dump.len(), self.file_path);
        Ok(())
    }

    fn update<F: FnOnce(&mut Dump) -> bool>(&self, f: F) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut dump = self.load_dump()?;
        if f(&mut dump) {
            self.save_dump(&dump)?;
        }
        Ok(())
    }
}

impl KeyValueStore for JsonFileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load_dump()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|dump| {
            dump.insert(key.to_owned(), value.to_owned());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|dump| dump.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.load_dump()?.into_keys().collect())
    }
}
