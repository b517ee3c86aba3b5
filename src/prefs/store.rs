//! Shared preferences snapshot with whole-value replacement.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tempfile::NamedTempFile;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::error::PreferencesError;
use super::schema::{Preferences, RawPreferences};

/// Preferences filename inside the application config directory.
pub const PREFERENCES_FILE: &str = "preferences.toml";

/// Holder of the current [`Preferences`].
///
/// Reads return an immutable `Arc` snapshot. [`update`](Self::update)
/// builds a complete new value from the current one and swaps it in, so a
/// reader never observes a half-applied change. When the store is backed by
/// a file every update is written through; write failures are logged and
/// otherwise ignored. Updates from several threads are applied and written
/// in the same order, so the file always ends at the latest value.
#[derive(Debug)]
pub struct PreferencesStore {
    current: watch::Sender<Arc<Preferences>>,
    path: Option<PathBuf>,
    writer: Mutex<()>,
}

impl PreferencesStore {
    /// A store that never touches the disk.
    #[must_use]
    pub fn in_memory(prefs: Preferences) -> Self {
        Self::with_path(prefs, None)
    }

    /// Load preferences from `path`, falling back to defaults.
    ///
    /// A missing file is normal on first start. An unreadable or malformed
    /// file is logged and replaced by defaults on the next update.
    #[must_use]
    pub fn load(path: PathBuf) -> Self {
        let prefs = match read_preferences(&path) {
            Ok(Some(prefs)) => {
                debug!("Loaded preferences from {:?}", path);
                prefs
            }
            Ok(None) => {
                debug!("No preferences at {:?}, using defaults", path);
                Preferences::default()
            }
            Err(e) => {
                warn!("{}; using default preferences", e);
                Preferences::default()
            }
        };

        Self::with_path(prefs, Some(path))
    }

    fn with_path(mut prefs: Preferences, path: Option<PathBuf>) -> Self {
        prefs.sanitize();
        let (current, _) = watch::channel(Arc::new(prefs));
        Self {
            current,
            path,
            writer: Mutex::new(()),
        }
    }

    /// The current snapshot.
    #[must_use]
    pub fn preferences(&self) -> Arc<Preferences> {
        Arc::clone(&*self.current.borrow())
    }

    /// Receiver that observes every replacement.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Preferences>> {
        self.current.subscribe()
    }

    /// Path the store writes to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Apply `edit` to a copy of the current value, sanitize, and replace.
    ///
    /// Returns the snapshot that was stored.
    pub fn update<F>(&self, edit: F) -> Arc<Preferences>
    where
        F: FnOnce(&mut Preferences),
    {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut stored = None;
        self.current.send_modify(|slot| {
            let mut next = (**slot).clone();
            edit(&mut next);
            next.sanitize();
            let next = Arc::new(next);
            stored = Some(Arc::clone(&next));
            *slot = next;
        });

        let stored = stored.unwrap_or_else(|| self.preferences());
        if let Some(path) = &self.path
            && let Err(e) = write_preferences(path, &stored)
        {
            warn!("Failed to persist preferences: {}", e);
        }
        stored
    }
}

fn read_preferences(path: &Path) -> Result<Option<Preferences>, PreferencesError> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let raw: RawPreferences =
                toml::from_str(&contents).map_err(|e| PreferencesError::Parse {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            Ok(Some(Preferences::from_raw(raw)))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PreferencesError::Read {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn write_preferences(path: &Path, prefs: &Preferences) -> Result<(), PreferencesError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PreferencesError::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let contents = toml::to_string_pretty(prefs)?;

    // Write to a uniquely named sibling and rename so a crash never leaves a
    // torn file.
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_error = |source| PreferencesError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_error)?;
    tmp.write_all(contents.as_bytes()).map_err(write_error)?;
    tmp.persist(path).map_err(|e| write_error(e.error))?;

    debug!("Wrote preferences to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::{StatsUnits, Theme};
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let store = PreferencesStore::load(dir.path().join(PREFERENCES_FILE));
        assert_eq!(*store.preferences(), Preferences::default());
    }

    #[test]
    fn test_malformed_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(PREFERENCES_FILE);
        fs::write(&path, "theme = [unterminated").unwrap();

        let store = PreferencesStore::load(path);
        assert_eq!(*store.preferences(), Preferences::default());
    }

    #[test]
    fn test_update_persists_and_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(PREFERENCES_FILE);

        let store = PreferencesStore::load(path.clone());
        store.update(|p| {
            p.theme = Theme::Dark;
            p.stats_units = StatsUnits::Bits;
        });

        let reloaded = PreferencesStore::load(path);
        assert_eq!(reloaded.preferences().theme, Theme::Dark);
        assert_eq!(reloaded.preferences().stats_units, StatsUnits::Bits);
    }

    #[test]
    fn test_old_snapshot_is_unaffected_by_update() {
        let store = PreferencesStore::in_memory(Preferences::default());
        let before = store.preferences();

        store.update(|p| p.show_footer = false);

        assert!(before.show_footer);
        assert!(!store.preferences().show_footer);
    }

    #[test]
    fn test_update_sanitizes() {
        let store = PreferencesStore::in_memory(Preferences::default());
        let stored = store.update(|p| p.language = "???".to_string());
        assert_eq!(stored.language, crate::prefs::DEFAULT_LANGUAGE);
    }

    #[test]
    fn test_write_failure_is_not_fatal() {
        let dir = tempdir().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = dir.path().join(PREFERENCES_FILE);
        fs::create_dir_all(path.join("occupied")).unwrap();

        let store = PreferencesStore::load(path);
        let stored = store.update(|p| p.auto_connect = true);

        assert!(stored.auto_connect);
        assert!(store.preferences().auto_connect);
    }

    #[test]
    fn test_concurrent_updates_leave_latest_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(PREFERENCES_FILE);
        let store = Arc::new(PreferencesStore::load(path.clone()));

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..20 {
                        store.update(|p| {
                            p.auto_connect = !p.auto_connect;
                            p.show_footer = i % 2 == 0;
                        });
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let on_disk = PreferencesStore::load(path);
        assert_eq!(*on_disk.preferences(), *store.preferences());

        // No temporary files are left next to the preferences.
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_subscribers_see_replacements() {
        let store = PreferencesStore::in_memory(Preferences::default());
        let mut rx = store.subscribe();

        store.update(|p| p.show_dataplane_logs = false);

        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().show_dataplane_logs);
    }
}
