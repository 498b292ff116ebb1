//! Test fixtures for stores and snapshot files.

use nestdb_core::{parse_resource, PersistenceGateway, Resource, ResourceStore};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A snapshot file inside a temporary directory that is removed on drop.
pub struct TempSnapshot {
    path: PathBuf,
    _temp_dir: TempDir,
}

impl TempSnapshot {
    /// Creates a fixture whose snapshot file does not exist yet.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("persist.json");
        Self {
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Creates a fixture whose snapshot file holds `contents`.
    pub fn with_contents(contents: &str) -> Self {
        let fixture = Self::new();
        std::fs::write(&fixture.path, contents).expect("Failed to write snapshot");
        fixture
    }

    /// Returns the snapshot path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a gateway bound to the snapshot path.
    pub fn gateway(&self) -> PersistenceGateway {
        PersistenceGateway::new(Some(self.path.clone()))
    }

    /// Returns an empty store.
    pub fn store(&self) -> ResourceStore {
        ResourceStore::new()
    }

    /// Restores a fresh store from the snapshot file.
    pub fn reload(&self) -> ResourceStore {
        let snapshot = self.gateway().restore().expect("Failed to restore snapshot");
        ResourceStore::from_snapshot(snapshot)
    }

    /// Reads the snapshot file as raw JSON.
    pub fn read_json(&self) -> serde_json::Value {
        let bytes = std::fs::read(&self.path).expect("Failed to read snapshot");
        serde_json::from_slice(&bytes).expect("Snapshot is not JSON")
    }
}

impl Default for TempSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a JSON object literal into a document.
pub fn resource_from_json(json: &str) -> Resource {
    parse_resource(json.as_bytes()).expect("Invalid document literal")
}

/// Runs a test against a store restored from a temporary snapshot, then
/// persists the store and returns the closure's result.
pub fn with_persisted_store<F, R>(f: F) -> (R, TempSnapshot)
where
    F: FnOnce(&ResourceStore) -> R,
{
    let fixture = TempSnapshot::new();
    let store = fixture.reload();
    let result = f(&store);
    fixture
        .gateway()
        .persist_store(&store)
        .expect("Failed to persist store");
    (result, fixture)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a store with `count` namespaces `ns_0..ns_{count-1}`, each
    /// holding `{"index": i}`.
    pub fn populated_store(count: usize) -> ResourceStore {
        let store = ResourceStore::new();
        for i in 0..count {
            store.set(
                format!("ns_{}", i),
                resource_from_json(&format!(r#"{{"index":{}}}"#, i)),
            );
        }
        store
    }

    /// Creates a store with one deeply nested document under `deep`.
    pub fn nested_store(depth: usize) -> ResourceStore {
        let mut json = String::from("1");
        for level in (0..depth).rev() {
            json = format!(r#"{{"l{}":{}}}"#, level, json);
        }
        let store = ResourceStore::new();
        if depth > 0 {
            store.set("deep", resource_from_json(&json));
        } else {
            store.set("deep", Resource::new());
        }
        store
    }
}
