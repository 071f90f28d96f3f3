use crate::error::Result;
use crate::utils::atomic::write_atomically;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub division: String,
}

/// Persistent district -> coordinates cache, keyed by lowercase district
/// name. Loaded once at startup; every `put` rewrites the whole file before
/// returning. Entries never expire.
#[derive(Debug)]
pub struct GeocodeCache {
    path: PathBuf,
    entries: BTreeMap<String, CacheEntry>,
}

impl GeocodeCache {
    /// Load the cache file. A missing or empty file gives an empty cache;
    /// an unreadable one is logged and replaced on the next `put`.
    pub fn load(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let contents = fs::read_to_string(path)?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                match serde_json::from_str::<BTreeMap<String, CacheEntry>>(&contents) {
                    Ok(entries) => entries
                        .into_iter()
                        .map(|(name, entry)| (Self::key(&name), entry))
                        .collect(),
                    Err(e) => {
                        warn!(
                            "Ignoring unreadable geocode cache {}: {}",
                            path.display(),
                            e
                        );
                        BTreeMap::new()
                    }
                }
            }
        } else {
            BTreeMap::new()
        };

        debug!("Loaded {} geocode cache entries from {}", entries.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn get(&self, district: &str) -> Option<&CacheEntry> {
        self.entries.get(&Self::key(district))
    }

    /// Insert or replace an entry and persist immediately.
    pub fn put(&mut self, district: &str, entry: CacheEntry) -> Result<()> {
        self.entries.insert(Self::key(district), entry);
        self.flush()
    }

    /// Rewrite the entire cache file.
    pub fn flush(&self) -> Result<()> {
        write_atomically(&self.path, |w| {
            serde_json::to_writer_pretty(&mut *w, &self.entries)?;
            w.write_all(b"\n")?;
            Ok(())
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn key(district: &str) -> String {
        district.trim().to_lowercase()
    }
}
