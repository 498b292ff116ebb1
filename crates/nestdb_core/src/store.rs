//! In-memory resource store.

use crate::error::{CoreError, CoreResult};
use crate::merge::merge;
use crate::value::{Namespace, Resource};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Owned copy of every namespace and its document.
///
/// This is the unit that is restored from and persisted to disk.
pub type Snapshot = HashMap<Namespace, Resource>;

/// Namespace → document mapping shared by all request handlers.
///
/// # Thread Safety
///
/// Every operation runs under a single mutex, so each one is atomic with
/// respect to every other. In particular [`merge`](Self::merge) reads and
/// writes its namespace as one step, and two concurrent merges into the same
/// namespace cannot lose each other's keys. No operation performs I/O while
/// holding the lock.
///
/// # Example
///
/// ```rust
/// use nestdb_core::{Resource, ResourceStore, Value};
///
/// let store = ResourceStore::new();
/// let mut doc = Resource::new();
/// doc.insert("name".into(), Value::from("alice"));
///
/// store.set("users", doc);
/// assert!(store.has("users"));
/// assert_eq!(store.get("users").unwrap()["name"], Value::from("alice"));
/// ```
#[derive(Debug, Default)]
pub struct ResourceStore {
    resources: Mutex<Snapshot>,
}

impl ResourceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the contents of a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            resources: Mutex::new(snapshot),
        }
    }

    /// Returns true if a document is stored under `ns`.
    pub fn has(&self, ns: &str) -> bool {
        self.resources.lock().contains_key(ns)
    }

    /// Creates or replaces the document under `ns`.
    pub fn set(&self, ns: impl Into<Namespace>, doc: Resource) {
        let ns = ns.into();
        debug!(namespace = %ns, "resource updated");
        self.resources.lock().insert(ns, doc);
    }

    /// Returns a copy of the document under `ns`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the namespace is absent.
    pub fn get(&self, ns: &str) -> CoreResult<Resource> {
        let resources = self.resources.lock();
        let doc = resources.get(ns).ok_or_else(|| CoreError::not_found(ns))?;
        trace!(namespace = %ns, "resource queried");
        Ok(doc.clone())
    }

    /// Recursively merges `doc` into the document under `ns`.
    ///
    /// An absent namespace is treated as an empty document, so this also
    /// creates. Returns the resulting document.
    pub fn merge(&self, ns: impl Into<Namespace>, doc: Resource) -> Resource {
        let ns = ns.into();
        let mut resources = self.resources.lock();
        debug!(namespace = %ns, keys = doc.len(), "resource merged");
        let existing = resources.entry(ns).or_default();
        merge(existing, doc);
        existing.clone()
    }

    /// Removes the document under `ns`, returning it.
    ///
    /// Removing an absent namespace is a no-op and returns `None`.
    pub fn remove(&self, ns: &str) -> Option<Resource> {
        let removed = self.resources.lock().remove(ns);
        if removed.is_some() {
            debug!(namespace = %ns, "resource removed");
        }
        removed
    }

    /// Lists every stored namespace. The order is unspecified.
    pub fn list(&self) -> Vec<Namespace> {
        self.resources.lock().keys().cloned().collect()
    }

    /// Stores `doc` under `ns` only if the namespace is absent.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AlreadyExists`] and leaves the existing document
    /// untouched if the namespace is taken.
    pub fn create(&self, ns: impl Into<Namespace>, doc: Resource) -> CoreResult<()> {
        let ns = ns.into();
        let mut resources = self.resources.lock();
        if resources.contains_key(&ns) {
            return Err(CoreError::already_exists(ns));
        }
        debug!(namespace = %ns, "resource created");
        resources.insert(ns, doc);
        Ok(())
    }

    /// Stores `doc` under `ns`, refusing to replace an existing document
    /// unless `overwrite` is set. Returns the stored document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AlreadyExists`] if the namespace is taken and
    /// `overwrite` is false.
    pub fn put(
        &self,
        ns: impl Into<Namespace>,
        doc: Resource,
        overwrite: bool,
    ) -> CoreResult<Resource> {
        let ns = ns.into();
        let mut resources = self.resources.lock();
        if !overwrite && resources.contains_key(&ns) {
            return Err(CoreError::already_exists(ns));
        }
        debug!(namespace = %ns, overwrite, "resource updated");
        resources.insert(ns, doc.clone());
        Ok(doc)
    }

    /// Merges `doc` into an existing document. Returns the merged document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the namespace is absent; nothing is
    /// created in that case.
    pub fn update(&self, ns: &str, doc: Resource) -> CoreResult<Resource> {
        let mut resources = self.resources.lock();
        let existing = resources
            .get_mut(ns)
            .ok_or_else(|| CoreError::not_found(ns))?;
        debug!(namespace = %ns, keys = doc.len(), "resource merged");
        merge(existing, doc);
        Ok(existing.clone())
    }

    /// Removes an existing document and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the namespace is absent.
    pub fn delete(&self, ns: &str) -> CoreResult<Resource> {
        self.remove(ns).ok_or_else(|| CoreError::not_found(ns))
    }

    /// Returns the number of stored namespaces.
    pub fn len(&self) -> usize {
        self.resources.lock().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.resources.lock().is_empty()
    }

    /// Returns an owned copy of the whole mapping, taken atomically.
    pub fn snapshot(&self) -> Snapshot {
        self.resources.lock().clone()
    }

    /// Replaces the whole mapping with `snapshot`.
    pub fn replace_all(&self, snapshot: Snapshot) {
        *self.resources.lock() = snapshot;
    }
}
