//! Namespaced key-value storage backing books, progress and settings

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};
use thiserror::Error;

const RECORD_EXTENSION: &str = "json";
/// Holds the real key next to a record whose file name is hashed
const KEY_EXTENSION: &str = "key";
/// Longest encoded key used verbatim as a file stem
const MAX_PLAIN_STEM: usize = 120;
/// Readable prefix kept in front of the hash in a hashed stem
const HASHED_PREFIX: usize = 48;
/// Separates prefix and hash. Never produced by percent-encoding.
const HASH_MARKER: char = '~';

/// Characters kept verbatim in on-disk file names
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// Separate key spaces so listing books never sees progress records
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    Books,
    Progress,
    Settings,
}

impl Namespace {
    pub fn dir_name(self) -> &'static str {
        match self {
            Namespace::Books => "books",
            Namespace::Progress => "progress",
            Namespace::Settings => "settings",
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value capability injected into the progress store and library.
pub trait Storage: Send + Sync {
    fn list(&self, ns: Namespace) -> StorageResult<Vec<String>>;
    fn read(&self, ns: Namespace, key: &str) -> StorageResult<Option<String>>;
    fn write(&self, ns: Namespace, key: &str, value: &str) -> StorageResult<()>;
    /// Deleting an absent key is not an error.
    fn delete(&self, ns: Namespace, key: &str) -> StorageResult<()>;
}

fn check_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// One directory per namespace, one JSON file per key.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn namespace_dir(&self, ns: Namespace) -> PathBuf {
        self.root.join(ns.dir_name())
    }

    fn key_path(&self, ns: Namespace, key: &str) -> PathBuf {
        self.namespace_dir(ns)
            .join(format!("{}.{}", file_stem_for(key), RECORD_EXTENSION))
    }

    fn key_sidecar_path(&self, ns: Namespace, key: &str) -> PathBuf {
        self.namespace_dir(ns)
            .join(format!("{}.{}", file_stem_for(key), KEY_EXTENSION))
    }

    /// Key a record file was written under.
    fn key_for_stem(&self, dir: &Path, stem: &str) -> Option<String> {
        if is_hashed_stem(stem) {
            let sidecar = dir.join(format!("{}.{}", stem, KEY_EXTENSION));
            return match fs::read_to_string(&sidecar) {
                Ok(key) => Some(key),
                Err(e) => {
                    tracing::warn!(file = %sidecar.display(), error = %e, "Missing key for hashed record");
                    None
                }
            };
        }
        match percent_decode_str(stem).decode_utf8() {
            Ok(key) => Some(key.into_owned()),
            Err(e) => {
                tracing::warn!(stem, error = %e, "Skipping undecodable storage key");
                None
            }
        }
    }
}

/// File stem for a key: the percent-encoded key, or for long keys a short
/// encoded prefix plus the SHA-256 of the whole key, so names stay far
/// below the 255-byte file name limit.
fn file_stem_for(key: &str) -> String {
    let encoded = utf8_percent_encode(key, KEY_ENCODE_SET).to_string();
    if encoded.len() <= MAX_PLAIN_STEM {
        return encoded;
    }

    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    // Encoded text is ASCII, so any byte index is a char boundary
    format!(
        "{}{}{}",
        &encoded[..HASHED_PREFIX],
        HASH_MARKER,
        hex::encode(hasher.finalize())
    )
}

fn is_hashed_stem(stem: &str) -> bool {
    stem.contains(HASH_MARKER)
}

impl Storage for FileStorage {
    fn list(&self, ns: Namespace) -> StorageResult<Vec<String>> {
        let dir = self.namespace_dir(ns);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(key) = self.key_for_stem(&dir, stem) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn read(&self, ns: Namespace, key: &str) -> StorageResult<Option<String>> {
        check_key(key)?;
        match fs::read_to_string(self.key_path(ns, key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, ns: Namespace, key: &str, value: &str) -> StorageResult<()> {
        check_key(key)?;
        let dir = self.namespace_dir(ns);
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        let path = self.key_path(ns, key);
        let hashed = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(is_hashed_stem);
        if hashed {
            fs::write(self.key_sidecar_path(ns, key), key)?;
        }
        fs::write(path, value)?;
        Ok(())
    }

    fn delete(&self, ns: Namespace, key: &str) -> StorageResult<()> {
        check_key(key)?;
        remove_if_present(&self.key_path(ns, key))?;
        remove_if_present(&self.key_sidecar_path(ns, key))?;
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Process-local storage, used in tests and when the data directory is unusable.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<(Namespace, String), String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn list(&self, ns: Namespace) -> StorageResult<Vec<String>> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        let mut keys: Vec<String> = entries
            .keys()
            .filter(|(entry_ns, _)| *entry_ns == ns)
            .map(|(_, key)| key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn read(&self, ns: Namespace, key: &str) -> StorageResult<Option<String>> {
        check_key(key)?;
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(&(ns, key.to_string())).cloned())
    }

    fn write(&self, ns: Namespace, key: &str, value: &str) -> StorageResult<()> {
        check_key(key)?;
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.insert((ns, key.to_string()), value.to_string());
        Ok(())
    }

    fn delete(&self, ns: Namespace, key: &str) -> StorageResult<()> {
        check_key(key)?;
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.remove(&(ns, key.to_string()));
        Ok(())
    }
}
