//! Serve command: run the document server until a termination signal.

use nestdb_server::{NestServer, PersistOutcome, ServerConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Options for the serve command.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// Snapshot file; empty disables persistence.
    pub file: PathBuf,
    /// Listen host.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Serve HTTPS with a self-signed certificate.
    pub secure: bool,
    /// Shutdown grace period in seconds.
    pub grace_period: u64,
}

impl ServeOptions {
    /// Builds the server configuration.
    pub fn to_config(&self) -> ServerConfig {
        ServerConfig::new(self.host.clone(), self.port)
            .with_secure(self.secure)
            .with_persist_path(self.file.clone())
            .with_shutdown_grace(Duration::from_secs(self.grace_period))
    }
}

/// Runs the server. Returns once shutdown has completed.
pub fn run(options: ServeOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = options.to_config();
    match &config.persist_path {
        Some(path) => info!("persisting state to {:?}", path),
        None => info!("persistence disabled"),
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(async {
        let server = NestServer::new(config)?;
        server.run().await
    })?;

    if !report.drained {
        warn!("shutdown grace period elapsed before all requests finished");
    }
    if let PersistOutcome::Failed(reason) = &report.persist {
        warn!("state was not persisted: {}", reason);
    }
    info!("server exited properly");

    Ok(())
}
