//! # NestDB Server
//!
//! HTTP front end for the NestDB document store.
//!
//! This crate provides:
//! - HTTP endpoints for listing, creating, reading, merging and deleting
//!   documents (see [`router`] for the route table)
//! - A JSON error envelope for every failure
//! - Optional HTTPS with a self-signed certificate generated at startup
//! - Graceful shutdown: stop accepting, drain in-flight requests for a
//!   bounded grace period, then persist the store exactly once
//!
//! # Lifecycle
//!
//! 1. [`NestServer::new`] restores the snapshot file (fatal on failure)
//! 2. [`NestServer::run`] serves until SIGINT/SIGTERM
//! 3. The listener stops accepting and in-flight requests get
//!    [`ServerConfig::shutdown_grace`] to finish
//! 4. The store is persisted once, whether or not the drain completed
//!
//! ```rust,ignore
//! use nestdb_server::{NestServer, ServerConfig};
//!
//! let config = ServerConfig::default().with_persist_path("persist.json");
//! let report = NestServer::new(config)?.run().await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod config;
mod error;
mod handler;
pub mod router;
mod server;
mod signal;
mod tls;

pub use config::{
    ServerConfig, DEFAULT_HOST, DEFAULT_MAX_BODY_BYTES, DEFAULT_PORT, DEFAULT_SHUTDOWN_GRACE,
};
pub use error::{Envelope, NoFields, ServerError, ServerResult};
pub use handler::{AddResource, RequestHandler};
pub use server::{NestServer, PersistOutcome, RunningServer, ShutdownReport};
pub use signal::shutdown_signal;
pub use tls::{generate_self_signed, SelfSignedCert};
