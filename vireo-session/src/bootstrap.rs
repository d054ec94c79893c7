//! Legacy bootstrap mirror
//!
//! A small synchronous TOML file holding a denormalized copy of the
//! active server URL and access token. Read once at earliest startup,
//! before the database is opened, to pre-configure the network
//! handle; written after every successful authentication.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;
use vireo_common::Result;

use crate::handle::ApiHandle;

/// The mirrored (url, token) pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapEntry {
    pub server_url: Option<String>,
    pub access_token: Option<String>,
}

/// File-backed mirror of the active connection
#[derive(Debug, Clone)]
pub struct BootstrapMirror {
    path: PathBuf,
}

impl BootstrapMirror {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Overwrite the mirror with the given pair
    pub fn put(&self, server_url: Option<&str>, access_token: Option<&str>) -> Result<()> {
        let entry = BootstrapEntry {
            server_url: server_url.map(str::to_string),
            access_token: access_token.map(str::to_string),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let encoded = toml::to_string(&entry)
            .map_err(|e| vireo_common::Error::Config(e.to_string()))?;
        std::fs::write(&self.path, encoded)?;

        Ok(())
    }

    /// Read the mirror; any failure reads as "nothing mirrored"
    pub fn load(&self) -> Option<BootstrapEntry> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match toml::from_str(&content) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("ignoring unreadable bootstrap mirror: {e}");
                None
            }
        }
    }

    /// Pre-configure the network handle from the mirror, for the
    /// startup path that runs before the database is available
    pub fn seed(&self, handle: &ApiHandle) {
        if let Some(entry) = self.load() {
            handle.configure(entry.server_url, entry.access_token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = BootstrapMirror::new(dir.path().join("bootstrap.toml"));

        mirror.put(Some("http://a"), Some("tok1")).unwrap();

        let entry = mirror.load().expect("mirror should be readable");
        assert_eq!(entry.server_url.as_deref(), Some("http://a"));
        assert_eq!(entry.access_token.as_deref(), Some("tok1"));
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = BootstrapMirror::new(dir.path().join("bootstrap.toml"));

        assert!(mirror.load().is_none());
    }

    #[test]
    fn seed_configures_handle() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = BootstrapMirror::new(dir.path().join("bootstrap.toml"));
        mirror.put(Some("http://a"), Some("tok1")).unwrap();

        let handle = ApiHandle::new();
        mirror.seed(&handle);

        let snap = handle.snapshot();
        assert_eq!(snap.base_url.as_deref(), Some("http://a"));
        assert_eq!(snap.access_token.as_deref(), Some("tok1"));
    }

    #[test]
    fn seed_without_mirror_leaves_handle_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = BootstrapMirror::new(dir.path().join("bootstrap.toml"));

        let handle = ApiHandle::new();
        mirror.seed(&handle);

        assert_eq!(handle.snapshot(), Default::default());
    }
}
