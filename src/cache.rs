/*
    edskit
    https://github.com/dbalsom/edskit

    Copyright 2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    src/cache.rs

    A parse cache over a storage directory of image files, keyed by file
    name and validated by modification time. Parsed images are immutable and
    shared out behind Arc; parse failures are cached too, so a directory
    listing can report per-image status without re-reading broken files on
    every request.
*/

use std::{collections::HashMap, path::PathBuf, sync::Arc, time::SystemTime};

use crate::{DiskImage, DiskImageError};

struct CacheEntry {
    mtime: Option<SystemTime>,
    size: u64,
    result: Result<Arc<DiskImage>, DiskImageError>,
}

/// A process-wide map from image file name to parsed image, bound to one
/// storage directory at a time.
pub struct DiskCache {
    dir: PathBuf,
    entries: HashMap<String, CacheEntry>,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>) -> DiskCache {
        DiskCache {
            dir: dir.into(),
            entries: HashMap::new(),
        }
    }

    pub fn directory(&self) -> &PathBuf {
        &self.dir
    }

    /// Point the cache at a different storage directory, discarding every
    /// entry.
    pub fn set_directory(&mut self, dir: impl Into<PathBuf>) {
        self.dir = dir.into();
        self.clear();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop one entry, by file name. Wired to file-watcher notifications.
    pub fn invalidate(&mut self, name: &str) {
        self.entries.remove(name);
    }

    /// Number of cached entries, parsed or failed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fetch the parsed image for `name`, reusing the cached parse while the
    /// file's modification time is unchanged. Zero-length files fail
    /// [DiskImageError::EmptyImage]. A failed parse is cached and returned
    /// again without touching the file until its mtime changes.
    pub fn get(&mut self, name: &str) -> Result<Arc<DiskImage>, DiskImageError> {
        let path = self.dir.join(name);
        let metadata = std::fs::metadata(&path)?;

        if metadata.len() == 0 {
            return Err(DiskImageError::EmptyImage);
        }

        let mtime = metadata.modified().ok();

        if let Some(entry) = self.entries.get(name) {
            if entry.mtime == mtime && entry.mtime.is_some() {
                log::trace!("get: cache hit for {:?}", name);
                return entry.result.clone();
            }
            log::debug!("get: {:?} changed on disk; reparsing", name);
        }

        let result = std::fs::read(&path)
            .map_err(DiskImageError::from)
            .and_then(DiskImage::load)
            .map(Arc::new);

        if let Err(e) = &result {
            log::warn!("get: parse of {:?} failed: {}", name, e);
        }

        self.entries.insert(
            name.to_string(),
            CacheEntry {
                mtime,
                size: metadata.len(),
                result: result.clone(),
            },
        );

        result
    }

    /// Per-image status without forcing a parse: `(name, size, error)` for
    /// every cached entry. Listing endpoints use this to annotate broken
    /// images.
    pub fn statuses(&self) -> Vec<(String, u64, Option<DiskImageError>)> {
        let mut statuses: Vec<_> = self
            .entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.size, entry.result.as_ref().err().cloned()))
            .collect();
        statuses.sort_by(|a, b| a.0.cmp(&b.0));
        statuses
    }
}
