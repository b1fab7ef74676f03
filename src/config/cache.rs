// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Process-wide configuration cache.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::error::ConfigError;

use super::Snapshot;

/// Single-slot cache of the last loaded [`Snapshot`].
///
/// The slot is refreshed when the requested file differs from the cached one
/// or when the file's modification time changed since it was loaded. The
/// check and the reload run under one lock, so callers never observe a
/// half-installed snapshot. A failed reload leaves the previous snapshot in
/// place.
///
/// # Examples
///
/// ```no_run
/// use assistant_bridge::config::ConfigCache;
///
/// # fn example() -> Result<(), assistant_bridge::error::ConfigError> {
/// let snapshot = ConfigCache::global().snapshot("config.yaml")?;
/// println!("{} devices", snapshot.devices().len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigCache {
    slot: Mutex<Option<Arc<Snapshot>>>,
    loads: AtomicUsize,
}

impl ConfigCache {
    /// Creates an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: parking_lot::const_mutex(None),
            loads: AtomicUsize::new(0),
        }
    }

    /// Returns the process-wide cache.
    #[must_use]
    pub fn global() -> &'static Self {
        static GLOBAL: ConfigCache = ConfigCache::new();
        &GLOBAL
    }

    /// Returns the snapshot for `path`, reloading it if the file changed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be stat'ed, read or parsed.
    pub fn snapshot(&self, path: impl AsRef<Path>) -> Result<Arc<Snapshot>, ConfigError> {
        let path = path.as_ref();
        let modified = std::fs::metadata(path)?.modified()?;

        let mut slot = self.slot.lock();
        if let Some(current) = slot.as_ref().filter(|s| s.is_current(path, modified)) {
            tracing::trace!(path = %path.display(), "Configuration cache hit");
            return Ok(Arc::clone(current));
        }

        let snapshot = Arc::new(Snapshot::load(path)?);
        self.loads.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            path = %path.display(),
            devices = snapshot.devices().len(),
            "Configuration reloaded"
        );

        *slot = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Returns the cached snapshot without checking the file.
    #[must_use]
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.slot.lock().clone()
    }

    /// Empties the slot so the next call reloads.
    pub fn invalidate(&self) {
        self.slot.lock().take();
    }

    /// Returns how many times a file was loaded by this cache.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

impl Default for ConfigCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};
    use std::time::{Duration, SystemTime};

    use tempfile::TempDir;

    use super::*;

    const CONFIG: &str = "openhab: http://openhab:8080\ndevices:\n  plug:\n    type: OUTLET\n    name: Plug\n    traits:\n      OnOff: Plug_Power\n";

    fn write_config(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn touch(path: &Path, offset: Duration) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + offset).unwrap();
    }

    #[test]
    fn unchanged_file_loads_once() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "config.yaml", CONFIG);
        let cache = ConfigCache::new();

        let first = cache.snapshot(&path).unwrap();
        let second = cache.snapshot(&path).unwrap();

        assert_eq!(cache.load_count(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn touched_file_reloads_once() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "config.yaml", CONFIG);
        let cache = ConfigCache::new();

        let first = cache.snapshot(&path).unwrap();
        touch(&path, Duration::from_secs(60));
        let second = cache.snapshot(&path).unwrap();
        let third = cache.snapshot(&path).unwrap();

        assert_eq!(cache.load_count(), 2);
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&second, &third));
    }

    #[test]
    fn different_source_reloads() {
        let dir = TempDir::new().unwrap();
        let a = write_config(&dir, "a.yaml", CONFIG);
        let b = write_config(&dir, "b.yaml", CONFIG);
        let cache = ConfigCache::new();

        cache.snapshot(&a).unwrap();
        let snapshot = cache.snapshot(&b).unwrap();

        assert_eq!(cache.load_count(), 2);
        assert_eq!(snapshot.source(), b.as_path());
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "config.yaml", CONFIG);
        let cache = ConfigCache::new();

        let good = cache.snapshot(&path).unwrap();
        fs::write(&path, "openhab: http://openhab:8080\n").unwrap();
        touch(&path, Duration::from_secs(60));

        let result = cache.snapshot(&path);
        assert!(matches!(result, Err(ConfigError::MissingKey("devices"))));
        assert!(Arc::ptr_eq(&cache.current().unwrap(), &good));
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let cache = ConfigCache::new();

        let result = cache.snapshot(dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
        assert!(cache.current().is_none());
        assert_eq!(cache.load_count(), 0);
    }

    #[test]
    fn invalidate_forces_reload() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "config.yaml", CONFIG);
        let cache = ConfigCache::new();

        cache.snapshot(&path).unwrap();
        cache.invalidate();
        assert!(cache.current().is_none());
        cache.snapshot(&path).unwrap();

        assert_eq!(cache.load_count(), 2);
    }

    #[test]
    fn concurrent_callers_share_one_load() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "config.yaml", CONFIG);
        let cache = ConfigCache::new();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let snapshot = cache.snapshot(&path).unwrap();
                    assert!(snapshot.device("plug").is_some());
                });
            }
        });

        assert_eq!(cache.load_count(), 1);
    }
}
