//! Client and server configuration collaborators.
//!
//! The wizard only needs to list, create, delete and pick client
//! configurations and to make sure a server configuration exists. The
//! filesystem implementations keep one TOML file per client configuration
//! in a directory:
//!
//! ```text
//! ~/.config/tunnel-console/
//! ├── clients/
//! │   ├── office.toml
//! │   └── home-lab.toml
//! ├── server.toml
//! └── preferences.toml
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::error::StoreError;

/// Key every client configuration must define.
pub const NAME_KEY: &str = "name";

/// Key holding the server endpoint of a client configuration.
pub const SERVER_KEY: &str = "server";

/// Template written the first time server mode is chosen.
pub const DEFAULT_SERVER_CONFIG: &str = r#"# Tunnel server configuration
listen = "0.0.0.0:4096"
tun_name = "tun0"
address = "10.8.0.1/24"
"#;

/// A stored client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfigEntry {
    /// Display name from the `name` key.
    pub name: String,
    /// Where the configuration lives.
    pub path: PathBuf,
}

/// Access to stored client configurations.
pub trait ClientConfigStore: Send + Sync {
    /// All configurations, sorted by name.
    fn list(&self) -> Result<Vec<ClientConfigEntry>, StoreError>;

    /// Validate and store a configuration given as TOML text.
    fn create(&self, source: &str) -> Result<ClientConfigEntry, StoreError>;

    /// Remove a configuration.
    fn delete(&self, path: &Path) -> Result<(), StoreError>;

    /// Mark a configuration as the one about to be used.
    fn select(&self, path: &Path) -> Result<(), StoreError> {
        let _ = path;
        Ok(())
    }
}

/// Access to the server configuration.
pub trait ServerConfigManager: Send + Sync {
    /// Make sure a server configuration exists and return its path.
    fn ensure(&self) -> Result<PathBuf, StoreError>;
}

/// Parse client configuration text and return its name.
pub fn validate_client_config(source: &str) -> Result<String, StoreError> {
    let table: toml::Table = toml::from_str(source)?;

    let name = match table.get(NAME_KEY) {
        Some(toml::Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(_) => {
            return Err(StoreError::Invalid(format!(
                "`{}` must be a non-empty string",
                NAME_KEY
            )));
        }
        None => return Err(StoreError::Invalid(format!("missing `{}`", NAME_KEY))),
    };

    match table.get(SERVER_KEY) {
        Some(toml::Value::String(s)) if !s.trim().is_empty() => Ok(name),
        _ => Err(StoreError::Invalid(format!(
            "`{}` must name the server endpoint",
            SERVER_KEY
        ))),
    }
}

/// Client configurations stored as `*.toml` files in one directory.
#[derive(Debug, Clone)]
pub struct FsClientConfigStore {
    dir: PathBuf,
}

impl FsClientConfigStore {
    /// Store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Directory holding the configurations.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn io_error(path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn unused_path(&self, name: &str) -> PathBuf {
        let stem = slugify(name);
        let mut candidate = self.dir.join(format!("{}.toml", stem));
        let mut n = 2;
        while candidate.exists() {
            candidate = self.dir.join(format!("{}-{}.toml", stem, n));
            n += 1;
        }
        candidate
    }
}

impl ClientConfigStore for FsClientConfigStore {
    fn list(&self) -> Result<Vec<ClientConfigEntry>, StoreError> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::io_error(&self.dir, e)),
        };

        let mut entries = Vec::new();
        for dirent in read_dir {
            let path = dirent.map_err(|e| Self::io_error(&self.dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }

            let contents = fs::read_to_string(&path).map_err(|e| Self::io_error(&path, e))?;
            let name = match validate_client_config(&contents) {
                Ok(name) => name,
                Err(e) => {
                    debug!("Skipping {:?}: {}", path, e);
                    continue;
                }
            };
            entries.push(ClientConfigEntry { name, path });
        }

        entries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(entries)
    }

    fn create(&self, source: &str) -> Result<ClientConfigEntry, StoreError> {
        let name = validate_client_config(source)?;

        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(&self.dir, e))?;
        let path = self.unused_path(&name);

        let mut contents = source.trim().to_string();
        contents.push('\n');
        fs::write(&path, contents).map_err(|e| Self::io_error(&path, e))?;

        debug!("Created client config '{}' at {:?}", name, path);
        Ok(ClientConfigEntry { name, path })
    }

    fn delete(&self, path: &Path) -> Result<(), StoreError> {
        if path.parent() != Some(self.dir.as_path()) {
            return Err(StoreError::Invalid(format!(
                "{} is outside {}",
                path.display(),
                self.dir.display()
            )));
        }

        match fs::remove_file(path) {
            Ok(()) => {
                debug!("Deleted client config {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.to_path_buf()))
            }
            Err(e) => Err(Self::io_error(path, e)),
        }
    }

    fn select(&self, path: &Path) -> Result<(), StoreError> {
        if path.is_file() {
            Ok(())
        } else {
            Err(StoreError::NotFound(path.to_path_buf()))
        }
    }
}

/// Server configuration kept in a single file.
#[derive(Debug, Clone)]
pub struct FsServerConfigManager {
    path: PathBuf,
}

impl FsServerConfigManager {
    /// Manager for the configuration at `path`.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ServerConfigManager for FsServerConfigManager {
    fn ensure(&self) -> Result<PathBuf, StoreError> {
        if self.path.is_file() {
            return Ok(self.path.clone());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(&self.path, DEFAULT_SERVER_CONFIG).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            source: e,
        })?;

        debug!("Wrote default server config to {:?}", self.path);
        Ok(self.path.clone())
    }
}

/// Client configurations held in memory.
///
/// Useful for headless front-ends and tests where nothing should touch the
/// disk. Paths are synthetic (`memory/<slug>.toml`).
#[derive(Debug, Default)]
pub struct MemoryClientConfigStore {
    entries: Mutex<Vec<ClientConfigEntry>>,
}

impl MemoryClientConfigStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `(name, path)` pairs.
    #[must_use]
    pub fn with_entries<I, N, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: Into<PathBuf>,
    {
        let entries = entries
            .into_iter()
            .map(|(name, path)| ClientConfigEntry {
                name: name.into(),
                path: path.into(),
            })
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<ClientConfigEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ClientConfigStore for MemoryClientConfigStore {
    fn list(&self) -> Result<Vec<ClientConfigEntry>, StoreError> {
        let mut entries = self.entries().clone();
        entries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(entries)
    }

    fn create(&self, source: &str) -> Result<ClientConfigEntry, StoreError> {
        let name = validate_client_config(source)?;
        let mut entries = self.entries();

        let stem = slugify(&name);
        let mut path = PathBuf::from("memory").join(format!("{}.toml", stem));
        let mut n = 2;
        while entries.iter().any(|e| e.path == path) {
            path = PathBuf::from("memory").join(format!("{}-{}.toml", stem, n));
            n += 1;
        }

        let entry = ClientConfigEntry { name, path };
        entries.push(entry.clone());
        Ok(entry)
    }

    fn delete(&self, path: &Path) -> Result<(), StoreError> {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|e| e.path != path);
        if entries.len() == before {
            Err(StoreError::NotFound(path.to_path_buf()))
        } else {
            Ok(())
        }
    }

    fn select(&self, path: &Path) -> Result<(), StoreError> {
        if self.entries().iter().any(|e| e.path == path) {
            Ok(())
        } else {
            Err(StoreError::NotFound(path.to_path_buf()))
        }
    }
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "client".to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const OFFICE: &str = "name = \"Office VPN\"\nserver = \"vpn.example.com:4096\"\n";

    #[test]
    fn test_validate_requires_name_and_server() {
        assert_eq!(validate_client_config(OFFICE).unwrap(), "Office VPN");
        assert!(matches!(
            validate_client_config("server = \"x\""),
            Err(StoreError::Invalid(_))
        ));
        assert!(matches!(
            validate_client_config("name = \"x\""),
            Err(StoreError::Invalid(_))
        ));
        assert!(matches!(
            validate_client_config("name = 1\nserver = \"x\""),
            Err(StoreError::Invalid(_))
        ));
        assert!(matches!(
            validate_client_config("name = "),
            Err(StoreError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_directory_lists_nothing() {
        let dir = tempdir().unwrap();
        let store = FsClientConfigStore::new(dir.path().join("clients"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_create_list_delete() {
        let dir = tempdir().unwrap();
        let store = FsClientConfigStore::new(dir.path().join("clients"));

        let office = store.create(OFFICE).unwrap();
        assert!(office.path.ends_with("office-vpn.toml"));

        let second = store.create(OFFICE).unwrap();
        assert!(second.path.ends_with("office-vpn-2.toml"));

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|e| e.name == "Office VPN"));

        store.select(&office.path).unwrap();
        store.delete(&office.path).unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
        assert!(matches!(store.delete(&office.path), Err(StoreError::NotFound(_))));
        assert!(matches!(store.select(&office.path), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_list_skips_invalid_files() {
        let dir = tempdir().unwrap();
        let clients = dir.path().join("clients");
        fs::create_dir_all(&clients).unwrap();
        fs::write(clients.join("broken.toml"), "not = [valid").unwrap();
        fs::write(clients.join("notes.txt"), OFFICE).unwrap();
        fs::write(clients.join("ok.toml"), OFFICE).unwrap();

        let store = FsClientConfigStore::new(clients);
        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].path.ends_with("ok.toml"));
    }

    #[test]
    fn test_delete_outside_store_is_rejected() {
        let dir = tempdir().unwrap();
        let store = FsClientConfigStore::new(dir.path().join("clients"));
        let outside = dir.path().join("server.toml");
        fs::write(&outside, "x = 1").unwrap();

        assert!(matches!(store.delete(&outside), Err(StoreError::Invalid(_))));
        assert!(outside.exists());
    }

    #[test]
    fn test_server_config_created_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("server.toml");
        let manager = FsServerConfigManager::new(path.clone());

        assert_eq!(manager.ensure().unwrap(), path);
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_SERVER_CONFIG);

        fs::write(&path, "listen = \"127.0.0.1:1\"").unwrap();
        manager.ensure().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "listen = \"127.0.0.1:1\"");
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryClientConfigStore::with_entries([("Zeta", "/z.toml"), ("alpha", "/a.toml")]);
        let listed = store.list().unwrap();
        assert_eq!(listed[0].name, "alpha");

        let created = store.create(OFFICE).unwrap();
        assert_eq!(created.path, PathBuf::from("memory/office-vpn.toml"));
        assert_eq!(store.list().unwrap().len(), 3);

        store.delete(Path::new("/z.toml")).unwrap();
        assert!(store.select(Path::new("/z.toml")).is_err());
        assert!(store.select(Path::new("/a.toml")).is_ok());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Office VPN"), "office-vpn");
        assert_eq!(slugify("  --  "), "client");
        assert_eq!(slugify("a//b"), "a-b");
    }
}
