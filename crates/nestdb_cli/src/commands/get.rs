//! Get command: print one document from a snapshot file.

use nestdb_core::{PersistenceGateway, Resource, ResourceStore};
use std::path::Path;

/// Runs the get command.
pub fn run(path: &Path, namespace: &str) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load(path, namespace)?;
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

/// Loads the document stored under `namespace` in the snapshot at `path`.
pub fn load(path: &Path, namespace: &str) -> Result<Resource, Box<dyn std::error::Error>> {
    if path.as_os_str().is_empty() {
        return Err("Snapshot path required for get".into());
    }
    let gateway = PersistenceGateway::new(Some(path.to_path_buf()));
    let store = ResourceStore::from_snapshot(gateway.restore()?);
    Ok(store.get(namespace)?)
}
