//! Persisted reference-bundle cache.
//!
//! Bundles are stored as JSON strings in an injected [`ReferenceStore`] under a
//! [`fingerprint`] of everything the back-translations depend on. Entries are
//! never evicted.

use crate::candidate::{Candidate, ReferenceBundle};
use crate::i18n::Language;
use anyhow::{Context, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

const FINGERPRINT_PREFIX: &str = "back_translations";

/// String key/value storage that outlives a single evaluation.
pub trait ReferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-local store, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ReferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object on disk.
///
/// The file is read once when the store is opened and rewritten on every
/// `set`, so a new process sees everything earlier processes stored.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read reference cache {}", path.display()))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)
                    .with_context(|| format!("Reference cache {} is not valid JSON", path.display()))?
            }
        } else {
            BTreeMap::new()
        };

        debug!("Opened reference cache {} with {} entries", path.display(), entries.len());

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache directory {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(entries).context("Failed to serialize reference cache")?;

        // Write then rename so a crash never leaves a truncated cache behind
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        Ok(())
    }
}

impl ReferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }
}

/// Cache key for the back-translations of a candidate set.
///
/// Covers the language pair and every candidate's key and text, sorted by key
/// so the roster order does not matter. Changing any text changes the key.
pub fn fingerprint(source: Language, target: Language, candidates: &[Candidate]) -> String {
    let mut entries: Vec<(&str, Option<&str>)> = candidates
        .iter()
        .map(|c| (c.key.as_str(), c.scorable_text()))
        .collect();
    entries.sort();

    let mut hasher = blake3::Hasher::new();
    for (key, text) in entries {
        update_field(&mut hasher, key);
        match text {
            Some(text) => {
                hasher.update(b"T");
                update_field(&mut hasher, text);
            }
            None => {
                hasher.update(b"F");
            }
        }
    }

    format!(
        "{}:{}:{}:{}",
        FINGERPRINT_PREFIX,
        source.code(),
        target.code(),
        hasher.finalize().to_hex()
    )
}

/// Length-prefix each field so ("ab", "c") and ("a", "bc") hash differently.
fn update_field(hasher: &mut blake3::Hasher, value: &str) {
    hasher.update(&(value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

/// Typed access to reference bundles in a [`ReferenceStore`].
#[derive(Clone)]
pub struct ReferenceCache {
    store: Arc<dyn ReferenceStore>,
}

impl ReferenceCache {
    pub fn new(store: Arc<dyn ReferenceStore>) -> Self {
        Self { store }
    }

    /// Look up a bundle. Unreadable or corrupt entries count as a miss.
    pub fn load(&self, fingerprint: &str) -> Option<ReferenceBundle> {
        let raw = match self.store.get(fingerprint) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Reference cache read failed for {}: {:#}", fingerprint, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(bundle) => Some(bundle),
            Err(e) => {
                warn!("Ignoring corrupt reference cache entry {}: {}", fingerprint, e);
                None
            }
        }
    }

    pub fn save(&self, fingerprint: &str, bundle: &ReferenceBundle) -> Result<()> {
        let json = serde_json::to_string(bundle).context("Failed to serialize reference bundle")?;
        self.store.set(fingerprint, &json)
    }
}
