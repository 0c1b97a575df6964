//! Two-tier response cache: an LRU in memory with a byte budget, backed by
//! one file per entry on disk.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use bytes::Bytes;
use lru::LruCache;
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::LoaderError;

/// Request identity: hex SHA-256 of the URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_url(url: &Url) -> Self {
        let digest = Sha256::digest(url.as_str().as_bytes());
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest {
            hex.push_str(&format!("{byte:02x}"));
        }
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
struct DiskTier {
    dir: PathBuf,
    capacity: u64,
}

impl DiskTier {
    fn path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.as_str())
    }

    fn read(&self, key: &CacheKey) -> Option<Bytes> {
        fs::read(self.path(key)).ok().map(Bytes::from)
    }

    fn write(&self, key: &CacheKey, body: &[u8]) -> Result<(), LoaderError> {
        let path = self.path(key);
        let tmp = path.with_extension("tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(body)?;
        file.sync_all()?;
        fs::rename(&tmp, &path)?;
        self.evict()
    }

    /// Delete the oldest entries until the directory fits the budget.
    fn evict(&self) -> Result<(), LoaderError> {
        let mut entries: Vec<(SystemTime, u64, PathBuf)> = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            if !meta.is_file() || is_temp(&entry.path()) {
                continue;
            }
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            entries.push((modified, meta.len(), entry.path()));
        }
        let mut total: u64 = entries.iter().map(|(_, len, _)| len).sum();
        if total <= self.capacity {
            return Ok(());
        }
        entries.sort_by_key(|(modified, _, _)| *modified);
        for (_, len, path) in entries {
            if total <= self.capacity {
                break;
            }
            fs::remove_file(&path)?;
            total = total.saturating_sub(len);
            tracing::debug!(path = %path.display(), "evicted from disk cache");
        }
        Ok(())
    }
}

fn is_temp(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "tmp")
}

/// Keyed store of successful response bodies.
#[derive(Debug)]
pub struct ResponseCache {
    memory: LruCache<CacheKey, Bytes>,
    memory_bytes: usize,
    memory_capacity: usize,
    disk: Option<DiskTier>,
}

impl ResponseCache {
    /// Memory-only cache.
    pub fn in_memory(memory_capacity: usize) -> Self {
        Self {
            memory: LruCache::unbounded(),
            memory_bytes: 0,
            memory_capacity,
            disk: None,
        }
    }

    /// Cache with a disk tier under `dir`, created if missing.
    pub fn with_disk(
        memory_capacity: usize,
        dir: impl Into<PathBuf>,
        disk_capacity: u64,
    ) -> Result<Self, LoaderError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::info!(dir = %dir.display(), disk_capacity, "disk cache ready");
        Ok(Self {
            disk: Some(DiskTier {
                dir,
                capacity: disk_capacity,
            }),
            ..Self::in_memory(memory_capacity)
        })
    }

    pub fn memory_bytes(&self) -> usize {
        self.memory_bytes
    }

    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// Look up a body, promoting a disk hit into memory.
    pub fn get(&mut self, key: &CacheKey) -> Option<Bytes> {
        if let Some(body) = self.memory.get(key) {
            tracing::trace!(%key, "memory cache hit");
            return Some(body.clone());
        }
        let body = self.disk.as_ref()?.read(key)?;
        tracing::debug!(%key, bytes = body.len(), "disk cache hit");
        self.insert_memory(key.clone(), body.clone());
        Some(body)
    }

    /// Store a body in both tiers. A disk failure leaves the memory entry
    /// in place and is returned to the caller.
    pub fn put(&mut self, key: CacheKey, body: Bytes) -> Result<(), LoaderError> {
        if let Some(disk) = self.disk.as_ref() {
            if let Err(err) = disk.write(&key, &body) {
                self.insert_memory(key, body);
                return Err(err);
            }
        }
        self.insert_memory(key, body);
        Ok(())
    }

    fn insert_memory(&mut self, key: CacheKey, body: Bytes) {
        if body.len() > self.memory_capacity {
            return;
        }
        self.memory_bytes += body.len();
        if let Some(old) = self.memory.put(key, body) {
            self.memory_bytes -= old.len();
        }
        while self.memory_bytes > self.memory_capacity {
            let Some((_, evicted)) = self.memory.pop_lru() else {
                break;
            };
            self.memory_bytes -= evicted.len();
        }
    }
}
