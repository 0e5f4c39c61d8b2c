//! JSON Lines backed semantic cache
//!
//! One `CachedEntry` per line. New entries are appended; evictions and
//! expiry cleanups rewrite the whole file through a temporary sibling so a
//! crash mid-rewrite leaves the previous file intact. Lines that fail to
//! parse are skipped with a warning rather than failing the load.
//!
//! File I/O is synchronous and runs on the calling task, and the file lock
//! is never held across an await. Appends are a single short line, so this
//! stays cheap for one interactive session; serving many concurrent
//! requests would need `store` and the rewrites moved to `spawn_blocking`.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::InMemorySemanticCache;
use crate::domain::semantic_cache::{
    CachedEntry, Neighbor, SemanticCache, SemanticCacheStats, SemanticSearchParams,
};
use crate::domain::DomainError;

/// Semantic cache persisted to a JSON Lines file
#[derive(Debug)]
pub struct FileSemanticCache {
    path: PathBuf,
    inner: InMemorySemanticCache,
    file: Mutex<File>,
}

impl FileSemanticCache {
    /// Open (or create) the cache file at `path` and load its entries
    pub fn open(path: impl AsRef<Path>, max_entries: Option<usize>) -> Result<Self, DomainError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                DomainError::storage(format!(
                    "Failed to create cache directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let entries = Self::load_entries(&path)?;
        let loaded = entries.len();
        let (inner, evicted) = InMemorySemanticCache::from_entries(entries, max_entries);

        let file = Self::open_append(&path)?;
        let cache = Self {
            path,
            inner,
            file: Mutex::new(file),
        };

        if evicted > 0 {
            cache.rewrite()?;
        }

        info!(
            path = %cache.path.display(),
            entries = loaded - evicted,
            "Semantic cache loaded"
        );

        Ok(cache)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_entries(path: &Path) -> Result<Vec<CachedEntry>, DomainError> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(path).map_err(|e| {
            DomainError::storage(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                DomainError::storage(format!("Failed to read {}: {}", path.display(), e))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<CachedEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(
                    path = %path.display(),
                    line = idx + 1,
                    error = %e,
                    "Skipping corrupt semantic cache line"
                ),
            }
        }

        Ok(entries)
    }

    fn open_append(path: &Path) -> Result<File, DomainError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| DomainError::storage(format!("Failed to open {}: {}", path.display(), e)))
    }

    fn lock_file(&self) -> Result<std::sync::MutexGuard<'_, File>, DomainError> {
        self.file
            .lock()
            .map_err(|e| DomainError::internal(format!("Failed to acquire file lock: {}", e)))
    }

    /// Rewrite the file from the in-memory entries
    fn rewrite(&self) -> Result<(), DomainError> {
        let mut file = self.lock_file()?;
        self.rewrite_locked(&mut file)
    }

    fn rewrite_locked(&self, file: &mut File) -> Result<(), DomainError> {
        let entries = self.inner.snapshot()?;
        let tmp_path = self.path.with_extension("jsonl.tmp");

        let write_tmp = || -> std::io::Result<()> {
            let mut tmp = File::create(&tmp_path)?;
            for entry in &entries {
                let line = serde_json::to_string(entry)?;
                writeln!(tmp, "{}", line)?;
            }
            tmp.sync_all()?;
            fs::rename(&tmp_path, &self.path)
        };

        write_tmp().map_err(|e| {
            DomainError::storage(format!("Failed to rewrite {}: {}", self.path.display(), e))
        })?;

        *file = Self::open_append(&self.path)?;

        debug!(path = %self.path.display(), entries = entries.len(), "Semantic cache rewritten");

        Ok(())
    }
}

#[async_trait]
impl SemanticCache for FileSemanticCache {
    async fn search(
        &self,
        embedding: &[f32],
        params: &SemanticSearchParams,
    ) -> Result<Vec<Neighbor>, DomainError> {
        self.inner.search(embedding, params).await
    }

    async fn store(&self, entry: CachedEntry) -> Result<(), DomainError> {
        let line = serde_json::to_string(&entry).map_err(|e| {
            DomainError::storage(format!("Failed to serialize cache entry: {}", e))
        })?;

        let mut file = self.lock_file()?;

        // File first, so memory never holds an entry the file lost
        writeln!(file, "{}", line).map_err(|e| {
            DomainError::storage(format!("Failed to append to {}: {}", self.path.display(), e))
        })?;

        let evicted = self.inner.insert(entry)?;
        if evicted > 0 {
            self.rewrite_locked(&mut file)?;
        }

        Ok(())
    }

    async fn stats(&self) -> Result<SemanticCacheStats, DomainError> {
        self.inner.stats().await
    }

    // Hit counters are session-local; persisting them would rewrite the file per hit.
    async fn record_hit(&self, id: &str) -> Result<(), DomainError> {
        self.inner.record_hit(id).await
    }

    async fn record_miss(&self) -> Result<(), DomainError> {
        self.inner.record_miss().await
    }

    async fn cleanup_expired(&self) -> Result<usize, DomainError> {
        let removed = self.inner.cleanup_expired().await?;

        if removed > 0 {
            self.rewrite()?;
        }

        Ok(removed)
    }

    async fn flush(&self) -> Result<(), DomainError> {
        let mut file = self.lock_file()?;

        file.flush()
            .and_then(|_| file.sync_all())
            .map_err(|e| DomainError::storage(format!("Failed to sync {}: {}", self.path.display(), e)))
    }
}
