//! Snapshot persistence.
//!
//! The whole store is saved to, and loaded from, a single JSON file:
//!
//! ```text
//! <dir>/
//! ├─ persist.json        # Snapshot: {"<namespace>": {...document...}, ...}
//! ├─ persist.json.lock   # Advisory lock for single-writer access
//! └─ persist.json.tmp    # Exists only while a snapshot is being written
//! ```
//!
//! The snapshot is replaced by renaming, which swaps its inode, so the lock
//! lives in a sidecar file that is never replaced. Every process and every
//! attempt locks the same sidecar.

use crate::error::{CoreError, CoreResult};
use crate::store::{ResourceStore, Snapshot};
use crate::value::Resource;
use fs2::FileExt;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Suffix of the sidecar lock file.
const LOCK_SUFFIX: &str = ".lock";
/// Suffix of the temporary file used for atomic snapshot writes.
const TEMP_SUFFIX: &str = ".tmp";

/// Loads and saves store snapshots under an exclusive file lock.
///
/// A gateway without a path (or with an empty one) is disabled: both
/// [`restore`](Self::restore) and [`persist`](Self::persist) succeed
/// without touching the filesystem.
///
/// # Example
///
/// ```rust,ignore
/// use nestdb_core::{PersistenceGateway, ResourceStore};
///
/// let gateway = PersistenceGateway::new(Some("persist.json".into()));
/// let store = ResourceStore::from_snapshot(gateway.restore()?);
/// // ... serve requests ...
/// gateway.persist(&store.snapshot())?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PersistenceGateway {
    path: Option<PathBuf>,
}

/// Outcome of a successful [`PersistenceGateway::persist`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistReport {
    /// Number of namespaces written.
    pub namespaces: usize,
    /// Size of the snapshot file in bytes.
    pub bytes: u64,
}

impl PersistenceGateway {
    /// Creates a gateway for `path`. `None` or an empty path disables persistence.
    pub fn new(path: Option<PathBuf>) -> Self {
        let path = path.filter(|p| !p.as_os_str().is_empty());
        Self { path }
    }

    /// Creates a disabled gateway.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Returns true if a snapshot path is configured.
    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Returns the snapshot path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the path of the sidecar lock file.
    pub fn lock_path(&self) -> Option<PathBuf> {
        self.path.as_deref().map(|p| with_suffix(p, LOCK_SUFFIX))
    }

    /// Loads the snapshot from disk.
    ///
    /// A missing or empty file yields an empty snapshot. Any other failure
    /// to look the file up is an error, never an empty snapshot.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Locked`] if another holder has the lock
    /// - [`CoreError::InvalidFormat`] if the file is not a JSON object of documents
    /// - [`CoreError::Io`] on read failures
    pub fn restore(&self) -> CoreResult<Snapshot> {
        let Some(path) = self.path.as_deref() else {
            return Ok(Snapshot::new());
        };

        if !path.try_exists()? {
            info!(path = %path.display(), "no state to restore");
            return Ok(Snapshot::new());
        }

        let _lock = FileLock::acquire(&with_suffix(path, LOCK_SUFFIX))?;

        let mut data = Vec::new();
        File::open(path)?.read_to_end(&mut data)?;

        if data.iter().all(u8::is_ascii_whitespace) {
            info!(path = %path.display(), "snapshot file is empty");
            return Ok(Snapshot::new());
        }

        let snapshot: Snapshot = serde_json::from_slice(&data)
            .map_err(|e| CoreError::invalid_format(path, e.to_string()))?;

        info!(
            path = %path.display(),
            namespaces = snapshot.len(),
            "state restored"
        );
        Ok(snapshot)
    }

    /// Saves `snapshot` to disk atomically.
    ///
    /// Uses write-then-rename for crash safety:
    /// 1. Write to `<path>.tmp`
    /// 2. Sync the temporary file to disk
    /// 3. Rename it over `<path>`
    /// 4. Fsync the directory so the rename is durable
    ///
    /// An interrupted write leaves the previous snapshot intact.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Locked`] if another holder has the lock
    /// - [`CoreError::Encode`] if the snapshot cannot be serialized
    /// - [`CoreError::Io`] on write failures
    pub fn persist(&self, snapshot: &Snapshot) -> CoreResult<PersistReport> {
        let Some(path) = self.path.as_deref() else {
            return Ok(PersistReport {
                namespaces: 0,
                bytes: 0,
            });
        };

        let dir = parent_dir(path);
        fs::create_dir_all(dir)?;

        let _lock = FileLock::acquire(&with_suffix(path, LOCK_SUFFIX))?;

        let temp = TempFile::new(with_suffix(path, TEMP_SUFFIX));
        // Sorted keys keep successive snapshots diffable.
        let ordered: BTreeMap<&String, &Resource> = snapshot.iter().collect();

        let file = File::create(temp.path())?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &ordered).map_err(CoreError::Encode)?;
        writer.write_all(b"\n")?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        let bytes = file.metadata()?.len();
        drop(file);

        fs::rename(temp.path(), path)?;
        temp.keep();
        sync_directory(dir)?;

        info!(
            path = %path.display(),
            namespaces = snapshot.len(),
            bytes,
            "state persisted"
        );
        Ok(PersistReport {
            namespaces: snapshot.len(),
            bytes,
        })
    }

    /// Restores the snapshot into `store`, replacing its contents.
    ///
    /// Returns the number of namespaces loaded.
    pub fn restore_into(&self, store: &ResourceStore) -> CoreResult<usize> {
        let snapshot = self.restore()?;
        let count = snapshot.len();
        store.replace_all(snapshot);
        Ok(count)
    }

    /// Persists the current contents of `store`.
    ///
    /// Returns the number of namespaces written.
    pub fn persist_store(&self, store: &ResourceStore) -> CoreResult<usize> {
        Ok(self.persist(&store.snapshot())?.namespaces)
    }
}

/// Exclusive advisory lock on a file, released on drop.
///
/// Acquisition never waits: if another holder has the lock the attempt
/// fails immediately with [`CoreError::Locked`].
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Opens (creating if needed) `path` and takes an exclusive lock on it.
    pub fn acquire(path: &Path) -> CoreResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        if file.try_lock_exclusive().is_err() {
            return Err(CoreError::locked(path));
        }
        debug!(path = %path.display(), "lock acquired");

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Returns the path of the locked file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Closing the handle would release it too.
        let _ = FileExt::unlock(&self.file);
        debug!(path = %self.path.display(), "lock released");
    }
}

/// Temporary snapshot file, removed on drop unless [`keep`](Self::keep) was called.
struct TempFile {
    path: PathBuf,
    armed: bool,
}

impl TempFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// The file was renamed into place; nothing to clean up.
    fn keep(mut self) {
        self.armed = false;
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = fs::remove_file(&self.path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %self.path.display(), error = %e, "cannot remove temporary snapshot");
                }
            }
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Syncs a directory so that renames inside it are durable.
///
/// Windows NTFS journals metadata updates and does not support fsync on a
/// directory handle, so this is a no-op there.
#[cfg(unix)]
fn sync_directory(dir: &Path) -> CoreResult<()> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_directory(_dir: &Path) -> CoreResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use serde_json::json;
    use tempfile::tempdir;

    fn doc(json: serde_json::Value) -> Resource {
        Value::from(json).into_resource().unwrap()
    }

    fn sample_snapshot() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert("users".into(), doc(json!({"alice": {"age": 30}})));
        snapshot.insert("config".into(), doc(json!({"flags": [1, 2, 3], "on": true})));
        snapshot
    }

    #[test]
    fn disabled_gateway_is_noop() {
        let gateway = PersistenceGateway::disabled();
        assert!(!gateway.is_enabled());
        assert!(gateway.restore().unwrap().is_empty());
        assert_eq!(gateway.persist(&sample_snapshot()).unwrap().namespaces, 0);
    }

    #[test]
    fn empty_path_disables() {
        let gateway = PersistenceGateway::new(Some(PathBuf::new()));
        assert!(!gateway.is_enabled());
        assert!(gateway.lock_path().is_none());
    }

    #[test]
    fn restore_missing_file_is_empty() {
        let temp = tempdir().unwrap();
        let gateway = PersistenceGateway::new(Some(temp.path().join("missing.json")));
        assert!(gateway.restore().unwrap().is_empty());
    }

    #[test]
    fn restore_unreadable_location_is_error() {
        let temp = tempdir().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();

        let gateway = PersistenceGateway::new(Some(blocker.join("persist.json")));
        assert!(matches!(gateway.restore(), Err(CoreError::Io(_))));
    }

    #[test]
    fn deepest_accepted_document_survives_restart() {
        let mut body = String::from("true");
        for _ in 0..crate::value::MAX_DEPTH {
            body = format!(r#"{{"n":{}}}"#, body);
        }
        let deep = crate::value::parse_resource(body.as_bytes()).unwrap();

        let temp = tempdir().unwrap();
        let gateway = PersistenceGateway::new(Some(temp.path().join("persist.json")));
        let store = ResourceStore::new();
        store.set("deep", deep.clone());
        assert_eq!(gateway.persist_store(&store).unwrap(), 1);

        let restored = gateway.restore().unwrap();
        assert_eq!(restored["deep"], deep);
    }

    #[test]
    fn failed_write_removes_temp_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("persist.json");
        // A non-empty directory in the snapshot's place makes the rename fail.
        fs::create_dir_all(path.join("occupied")).unwrap();

        let gateway = PersistenceGateway::new(Some(path.clone()));
        assert!(gateway.persist(&sample_snapshot()).is_err());
        assert!(!with_suffix(&path, TEMP_SUFFIX).exists());
        assert!(path.is_dir());
    }

    #[test]
    fn persist_then_restore() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("persist.json");
        let gateway = PersistenceGateway::new(Some(path.clone()));

        let snapshot = sample_snapshot();
        let report = gateway.persist(&snapshot).unwrap();
        assert_eq!(report.namespaces, 2);
        assert!(report.bytes > 0);
        assert!(path.exists());
        assert!(!with_suffix(&path, TEMP_SUFFIX).exists());

        assert_eq!(gateway.restore().unwrap(), snapshot);
    }

    #[test]
    fn persisted_file_is_plain_json_object() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("persist.json");
        let gateway = PersistenceGateway::new(Some(path.clone()));
        gateway.persist(&sample_snapshot()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(
            raw,
            json!({
                "config": {"flags": [1, 2, 3], "on": true},
                "users": {"alice": {"age": 30}}
            })
        );
    }

    #[test]
    fn persist_replaces_previous_snapshot() {
        let temp = tempdir().unwrap();
        let gateway = PersistenceGateway::new(Some(temp.path().join("persist.json")));

        gateway.persist(&sample_snapshot()).unwrap();
        let mut smaller = Snapshot::new();
        smaller.insert("only".into(), doc(json!({"x": 1})));
        gateway.persist(&smaller).unwrap();

        assert_eq!(gateway.restore().unwrap(), smaller);
    }

    #[test]
    fn persist_creates_parent_directories() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("dir").join("persist.json");
        let gateway = PersistenceGateway::new(Some(path.clone()));
        gateway.persist(&sample_snapshot()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn restore_empty_file_is_empty() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("persist.json");
        fs::write(&path, b"").unwrap();
        let gateway = PersistenceGateway::new(Some(path));
        assert!(gateway.restore().unwrap().is_empty());
    }

    #[test]
    fn restore_rejects_malformed_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("persist.json");
        fs::write(&path, b"{\"users\": {\"alice\"").unwrap();
        let gateway = PersistenceGateway::new(Some(path));
        assert!(matches!(
            gateway.restore(),
            Err(CoreError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn restore_rejects_non_object_documents() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("persist.json");
        fs::write(&path, br#"{"users": [1, 2]}"#).unwrap();
        let gateway = PersistenceGateway::new(Some(path));
        assert!(matches!(
            gateway.restore(),
            Err(CoreError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn interrupted_write_keeps_previous_snapshot() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("persist.json");
        let gateway = PersistenceGateway::new(Some(path.clone()));
        let snapshot = sample_snapshot();
        gateway.persist(&snapshot).unwrap();

        // A crash after the temp file was partially written but before the rename.
        fs::write(with_suffix(&path, TEMP_SUFFIX), b"{\"users\": {\"al").unwrap();

        assert_eq!(gateway.restore().unwrap(), snapshot);
    }

    #[test]
    fn held_lock_fails_fast() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("persist.json");
        let gateway = PersistenceGateway::new(Some(path.clone()));
        gateway.persist(&sample_snapshot()).unwrap();

        let lock_path = gateway.lock_path().unwrap();
        let held = FileLock::acquire(&lock_path).unwrap();

        assert!(matches!(
            gateway.persist(&sample_snapshot()),
            Err(CoreError::Locked { .. })
        ));
        assert!(matches!(gateway.restore(), Err(CoreError::Locked { .. })));

        drop(held);
        assert!(gateway.restore().is_ok());
    }

    #[test]
    fn lock_released_after_each_operation() {
        let temp = tempdir().unwrap();
        let gateway = PersistenceGateway::new(Some(temp.path().join("persist.json")));

        gateway.persist(&sample_snapshot()).unwrap();
        gateway.restore().unwrap();

        let lock = FileLock::acquire(&gateway.lock_path().unwrap()).unwrap();
        assert_eq!(lock.path(), gateway.lock_path().unwrap().as_path());
    }

    #[test]
    fn lock_released_after_failed_restore() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("persist.json");
        fs::write(&path, b"not json").unwrap();
        let gateway = PersistenceGateway::new(Some(path));

        assert!(gateway.restore().is_err());
        assert!(FileLock::acquire(&gateway.lock_path().unwrap()).is_ok());
    }

    #[test]
    fn store_round_trip() {
        let temp = tempdir().unwrap();
        let gateway = PersistenceGateway::new(Some(temp.path().join("persist.json")));

        let store = ResourceStore::new();
        store.set("a", doc(json!({"x": 1})));
        store.merge("b", doc(json!({"n": {"y": [true, null]}})));
        store.set("c", Resource::new());
        store.remove("c");

        assert_eq!(gateway.persist_store(&store).unwrap(), 2);

        let fresh = ResourceStore::new();
        assert_eq!(gateway.restore_into(&fresh).unwrap(), 2);
        assert_eq!(fresh.snapshot(), store.snapshot());
    }
}
