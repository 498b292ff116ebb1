//! # NestDB Testkit
//!
//! Test utilities for NestDB.
//!
//! This crate provides:
//! - Temporary snapshot files and store fixtures
//! - Property-based test generators using proptest
//! - Concurrent merge stress helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nestdb_testkit::prelude::*;
//!
//! #[test]
//! fn survives_restart() {
//!     let fixture = TempSnapshot::new();
//!     let store = fixture.store();
//!     store.set("users", resource_from_json(r#"{"alice": 1}"#));
//!     fixture.gateway().persist_store(&store).unwrap();
//!     assert!(fixture.reload().has("users"));
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
