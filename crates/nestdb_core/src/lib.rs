//! # NestDB Core
//!
//! Document model, merge engine, resource store and snapshot persistence
//! for NestDB.
//!
//! This crate provides:
//! - [`Value`] / [`Resource`] - the JSON document model
//! - [`merge`] - recursive structural merge of documents
//! - [`ResourceStore`] - thread-safe namespace → document mapping
//! - [`PersistenceGateway`] - lock-protected, atomic snapshot file I/O
//!
//! ## Example
//!
//! ```rust
//! use nestdb_core::{ResourceStore, Value};
//!
//! let store = ResourceStore::new();
//! let doc = Value::from(serde_json::json!({"n": {"x": 1}})).into_resource().unwrap();
//! store.set("settings", doc);
//!
//! let patch = Value::from(serde_json::json!({"n": {"y": 2}})).into_resource().unwrap();
//! let merged = store.merge("settings", patch);
//! assert_eq!(merged["n"].as_object().unwrap().len(), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod error;
mod merge;
mod persist;
mod store;
mod value;

pub use error::{CoreError, CoreResult};
pub use merge::{merge, merged};
pub use persist::{FileLock, PersistReport, PersistenceGateway};
pub use store::{ResourceStore, Snapshot};
pub use value::{check_depth, document_depth, parse_resource, Namespace, Resource, Value, MAX_DEPTH};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
