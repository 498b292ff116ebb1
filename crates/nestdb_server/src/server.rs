//! Server lifecycle: restore, serve, drain, persist.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::RequestHandler;
use crate::router::router;
use crate::signal::shutdown_signal;
use crate::tls::{generate_self_signed, rustls_config};
use axum::Router;
use axum_server::Handle;
use nestdb_core::{PersistenceGateway, ResourceStore};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// What happened to the snapshot at shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// No persistence path is configured.
    Disabled,
    /// The snapshot was written.
    Written {
        /// Number of namespaces written.
        namespaces: usize,
    },
    /// Writing the snapshot failed; the error was logged.
    Failed(String),
}

/// Summary of a completed shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    /// True if every in-flight request finished within the grace period.
    pub drained: bool,
    /// Result of the single snapshot attempt.
    pub persist: PersistOutcome,
}

/// The document server.
///
/// Owns the store and the persistence gateway. Construction restores the
/// snapshot; [`run`](Self::run) serves until a termination signal and then
/// persists exactly once.
///
/// # Example
///
/// ```rust,ignore
/// use nestdb_server::{NestServer, ServerConfig};
///
/// let config = ServerConfig::default().with_persist_path("persist.json");
/// let server = NestServer::new(config)?;
/// let report = server.run().await?;
/// ```
pub struct NestServer {
    config: ServerConfig,
    store: Arc<ResourceStore>,
    gateway: PersistenceGateway,
}

impl NestServer {
    /// Creates a server and restores its store from the configured snapshot.
    ///
    /// # Errors
    ///
    /// Any restore failure other than a missing file is returned; the server
    /// must not start with a partially loaded store.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let gateway = PersistenceGateway::new(config.persist_path.clone());
        let store = Arc::new(ResourceStore::from_snapshot(gateway.restore()?));
        Ok(Self {
            config,
            store,
            gateway,
        })
    }

    /// Creates a server around an existing store without restoring anything.
    pub fn with_store(config: ServerConfig, store: Arc<ResourceStore>) -> Self {
        let gateway = PersistenceGateway::new(config.persist_path.clone());
        Self {
            config,
            store,
            gateway,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the shared store.
    pub fn store(&self) -> &Arc<ResourceStore> {
        &self.store
    }

    /// Builds the HTTP router over this server's store.
    pub fn router(&self) -> Router {
        router(
            RequestHandler::new(Arc::clone(&self.store)),
            self.config.max_body_bytes,
        )
    }

    /// Serves until SIGINT/SIGTERM, then drains and persists.
    pub async fn run(self) -> ServerResult<ShutdownReport> {
        self.run_until(shutdown_signal()).await
    }

    /// Serves until `shutdown` resolves, then drains and persists.
    pub async fn run_until<F>(self, shutdown: F) -> ServerResult<ShutdownReport>
    where
        F: Future<Output = ()> + Send,
    {
        let running = self.start().await?;
        shutdown.await;
        Ok(running.shutdown().await)
    }

    /// Binds the listener and starts serving in the background.
    pub async fn start(self) -> ServerResult<RunningServer> {
        let requested = self.config.address();
        let addr = resolve(&self.config.host, self.config.port)
            .await
            .map_err(|e| ServerError::bind(requested.clone(), e))?;

        let app = self.router();
        let handle = Handle::new();

        let mut task: JoinHandle<io::Result<()>> = if self.config.secure {
            let cert = generate_self_signed(&self.config.host)?;
            let tls = rustls_config(&cert).await?;
            let server = axum_server::bind_rustls(addr, tls).handle(handle.clone());
            tokio::spawn(async move { server.serve(app.into_make_service()).await })
        } else {
            let server = axum_server::bind(addr).handle(handle.clone());
            tokio::spawn(async move { server.serve(app.into_make_service()).await })
        };

        let Some(local_addr) = handle.listening().await else {
            let message = match (&mut task).await {
                Ok(Err(e)) => e.to_string(),
                Ok(Ok(())) => "listener closed before it was ready".to_string(),
                Err(e) => e.to_string(),
            };
            return Err(ServerError::bind(requested, message));
        };

        info!(
            "server listening on {}://{}",
            self.config.scheme(),
            local_addr
        );

        Ok(RunningServer {
            local_addr,
            handle,
            task,
            store: self.store,
            gateway: self.gateway,
            grace: self.config.shutdown_grace,
        })
    }
}

/// A server that is accepting connections.
///
/// Dropping it without calling [`shutdown`](Self::shutdown) leaves the
/// background task running and skips persistence.
pub struct RunningServer {
    local_addr: SocketAddr,
    handle: Handle,
    task: JoinHandle<io::Result<()>>,
    store: Arc<ResourceStore>,
    gateway: PersistenceGateway,
    grace: Duration,
}

impl RunningServer {
    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns the shared store.
    pub fn store(&self) -> &Arc<ResourceStore> {
        &self.store
    }

    /// Stops accepting, waits up to the grace period for in-flight requests,
    /// then persists the store once.
    ///
    /// Neither a drain timeout nor a persist failure is fatal: both are
    /// logged and reported.
    pub async fn shutdown(self) -> ShutdownReport {
        info!("shutting server down");
        self.handle.graceful_shutdown(None);

        let mut task = self.task;
        let drained = match tokio::time::timeout(self.grace, &mut task).await {
            Ok(joined) => {
                match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => error!(error = %e, "server stopped with error"),
                    Err(e) => error!(error = %e, "server task failed"),
                }
                true
            }
            Err(_) => {
                let err = ServerError::ShutdownTimeout { grace: self.grace };
                warn!(
                    connections = self.handle.connection_count(),
                    "{err}; closing remaining connections"
                );
                self.handle.shutdown();
                task.abort();
                false
            }
        };

        let persist = if self.gateway.is_enabled() {
            match self.gateway.persist(&self.store.snapshot()) {
                Ok(report) => PersistOutcome::Written {
                    namespaces: report.namespaces,
                },
                Err(e) => {
                    error!(error = %e, "failed to persist state");
                    PersistOutcome::Failed(e.to_string())
                }
            }
        } else {
            PersistOutcome::Disabled
        };

        info!(drained, "server exited");
        ShutdownReport { drained, persist }
    }
}

async fn resolve(host: &str, port: u16) -> io::Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "host resolved to no address"))
}
