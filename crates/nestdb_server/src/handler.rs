//! Request handlers for document endpoints.
//!
//! Each handler performs exactly one [`ResourceStore`] operation. They know
//! nothing about HTTP beyond taking raw request bodies; the router in
//! [`crate::router`] turns their results into responses.

use crate::error::{ServerError, ServerResult};
use nestdb_core::{check_depth, parse_resource, Namespace, Resource, ResourceStore};
use serde::Deserialize;
use std::sync::Arc;

/// Body of `POST /`: store a document under an explicit name.
#[derive(Debug, Clone, Deserialize)]
pub struct AddResource {
    /// Namespace to store under.
    pub name: Namespace,
    /// Document to store.
    pub value: Resource,
    /// Replace an existing document instead of failing.
    #[serde(default)]
    pub overwrite: bool,
}

/// Handler for document requests.
#[derive(Debug, Clone)]
pub struct RequestHandler {
    store: Arc<ResourceStore>,
}

impl RequestHandler {
    /// Creates a handler serving `store`.
    pub fn new(store: Arc<ResourceStore>) -> Self {
        Self { store }
    }

    /// Returns the store served by this handler.
    pub fn store(&self) -> &Arc<ResourceStore> {
        &self.store
    }

    /// Lists every namespace, sorted.
    pub fn handle_list(&self) -> Vec<Namespace> {
        let mut namespaces = self.store.list();
        namespaces.sort_unstable();
        namespaces
    }

    /// Stores the document described by an [`AddResource`] body and returns it.
    pub fn handle_add(&self, body: &[u8]) -> ServerResult<Resource> {
        let request: AddResource = serde_json::from_slice(body)
            .map_err(|e| ServerError::BadRequest(e.to_string()))?;
        if request.name.is_empty() {
            return Err(ServerError::BadRequest(
                "resource name must not be empty".into(),
            ));
        }
        check_depth(&request.value)?;
        Ok(self
            .store
            .put(request.name, request.value, request.overwrite)?)
    }

    /// Creates `ns` from `body` unless it already exists.
    pub fn handle_create(&self, ns: &str, body: &[u8]) -> ServerResult<()> {
        let doc = parse_resource(body)?;
        self.store.create(ns, doc)?;
        Ok(())
    }

    /// Returns the document under `ns`.
    pub fn handle_read(&self, ns: &str) -> ServerResult<Resource> {
        Ok(self.store.get(ns)?)
    }

    /// Merges `body` into the existing document under `ns`.
    pub fn handle_update(&self, ns: &str, body: &[u8]) -> ServerResult<Resource> {
        let doc = parse_resource(body)?;
        Ok(self.store.update(ns, doc)?)
    }

    /// Removes the document under `ns` and returns it.
    pub fn handle_delete(&self, ns: &str) -> ServerResult<Resource> {
        Ok(self.store.delete(ns)?)
    }
}
