use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::error::StoreError;

/// Key under which a host's access token is stored.
pub const OAUTH_TOKEN_KEY: &str = "oauth_token";
/// Key under which a host's preferred git transport is stored.
pub const GIT_PROTOCOL_KEY: &str = "git_protocol";

/// Host-keyed configuration with staged writes.
///
/// `set` only mutates the in-memory document; nothing is durable until
/// `commit` returns `Ok`.
pub trait CredentialStore: Send + Sync {
    fn get(&self, host: &str, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, host: &str, key: &str, value: &str) -> Result<(), StoreError>;
    fn commit(&self) -> Result<(), StoreError>;
}

/// On-disk shape of `hosts.toml`: one table of string fields per host.
///
/// ```toml
/// ["github.com"]
/// git_protocol = "ssh"
/// oauth_token = "gho_..."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostsDocument {
    hosts: BTreeMap<String, BTreeMap<String, String>>,
}

impl HostsDocument {
    pub fn get(&self, host: &str, key: &str) -> Option<&str> {
        self.hosts.get(host)?.get(key).map(String::as_str)
    }

    pub fn set(&mut self, host: String, key: &str, value: &str) {
        self.hosts
            .entry(host)
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts.keys().map(String::as_str)
    }
}

/// File-backed store over a single TOML document.
#[derive(Debug)]
pub struct FileHostsStore {
    path: PathBuf,
    staged: Mutex<HostsDocument>,
}

impl FileHostsStore {
    pub const FILE_NAME: &'static str = "hosts.toml";

    /// Load `path`, treating a missing file as an empty document.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let document = match fs::read_to_string(&path) {
            Ok(raw) => toml::from_str(&raw)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HostsDocument::default(),
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(path = %path.display(), "loaded hosts config");
        Ok(Self {
            path,
            staged: Mutex::new(document),
        })
    }

    /// Open `hosts.toml` inside `dir`.
    pub fn open_in(dir: &Path) -> Result<Self, StoreError> {
        Self::open(dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the staged document.
    pub fn document(&self) -> HostsDocument {
        self.staged().clone()
    }

    fn staged(&self) -> MutexGuard<'_, HostsDocument> {
        self.staged
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ensure_parent(path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl CredentialStore for FileHostsStore {
    fn get(&self, host: &str, key: &str) -> Result<Option<String>, StoreError> {
        let host = normalize_host(host)?;
        Ok(self.staged().get(&host, key).map(str::to_string))
    }

    fn set(&self, host: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let host = normalize_host(host)?;
        self.staged().set(host, key, value);
        Ok(())
    }

    fn commit(&self) -> Result<(), StoreError> {
        let serialized = toml::to_string(&*self.staged())?;
        Self::ensure_parent(&self.path)?;
        write_atomic(&self.path, serialized.as_bytes())?;
        tracing::debug!(path = %self.path.display(), "committed hosts config");
        Ok(())
    }
}

/// Write `data` to a sibling temp file created owner-only, sync it, then
/// rename it over `path`. The temp file never outlives a failed write.
fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| StoreError::Io(format!("{} has no file name", path.display())))?;
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_path = path.with_file_name(format!(
        ".{}.tmp-{}-{nonce}",
        file_name.to_string_lossy(),
        std::process::id()
    ));

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let write_result = (|| -> std::io::Result<()> {
        let mut temp_file = options.open(&temp_path)?;
        temp_file.write_all(data)?;
        temp_file.sync_all()?;
        Ok(())
    })();
    if let Err(err) = write_result {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }

    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

/// Canonical form of a hostname used as a store key.
pub fn normalize_host(host: &str) -> Result<String, StoreError> {
    let trimmed = host.trim();
    if trimmed.is_empty() || trimmed.contains(|c: char| c.is_whitespace() || c == '/') {
        return Err(StoreError::InvalidHost(host.to_string()));
    }
    Ok(trimmed.to_ascii_lowercase())
}
