// ABOUTME: Content-addressed asset cache for the smart-slides application
// ABOUTME: Maps deterministic content keys to previously fetched or rendered files

use crate::errors::{Result, SlideError};
use crate::utils::ensure_directory_exists;
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk store keyed by a stable content hash. Entries are never
/// invalidated; identical keys always resolve to the same file without a
/// second fetch or render.
#[derive(Debug, Clone)]
pub struct AssetCache {
    root: PathBuf,
}

impl AssetCache {
    /// Open a cache rooted at `root`, creating the directory tree as needed.
    pub fn open(root: &Path) -> Result<Self> {
        ensure_directory_exists(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Key for a photo search keyword: SHA-256 of the normalized keyword
    /// (trimmed, lowercased, inner whitespace collapsed).
    pub fn keyword_key(keyword: &str) -> String {
        let normalized = keyword
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        hex_digest(normalized.as_bytes())
    }

    /// Key for a rendered diagram: SHA-256 over the slide content plus the
    /// archetype and style, so the same content always re-resolves to the
    /// same rendering.
    pub fn diagram_key(title: &str, body: &str, archetype: &str, style: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(title.as_bytes());
        hasher.update(b"\n");
        hasher.update(body.as_bytes());
        hasher.update(b"\n");
        hasher.update(archetype.as_bytes());
        hasher.update(b"\n");
        hasher.update(style.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn entry_path(&self, key: &str, ext: &str) -> PathBuf {
        self.root.join(format!("{}.{}", key, ext))
    }

    /// Look up an entry; `None` means the asset has not been stored yet.
    pub fn resolve(&self, key: &str, ext: &str) -> Option<PathBuf> {
        let path = self.entry_path(key, ext);
        if path.is_file() {
            debug!("Cache hit for key {}", key);
            Some(path)
        } else {
            None
        }
    }

    /// Store bytes under a key. The write goes to a uniquely named temp file
    /// in the cache root and is renamed into place, so a concurrent store of
    /// the same key can never leave a corrupt entry. Storing an already
    /// present key returns the existing file untouched.
    pub fn store(&self, key: &str, ext: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.entry_path(key, ext);
        if path.is_file() {
            return Ok(path);
        }

        let tmp = self.root.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        fs::write(&tmp, bytes).map_err(SlideError::FileReadError)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            // A concurrent writer may have won the rename; the entry is
            // still valid in that case.
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!("Failed to clean up temp file {:?}: {}", tmp, cleanup);
            }
            if !path.is_file() {
                return Err(SlideError::FileReadError(e));
            }
        }
        debug!("Cached {} bytes under key {}", bytes.len(), key);
        Ok(path)
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
