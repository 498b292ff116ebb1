//! Server configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default listen host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;
/// Default time allowed for in-flight requests to finish at shutdown.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
/// Default maximum request body size (2 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Configuration for the document server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host part of the listen address.
    pub host: String,
    /// Port part of the listen address (0 picks a free port).
    pub port: u16,
    /// Serve HTTPS with a self-signed certificate generated at startup.
    pub secure: bool,
    /// Snapshot file. `None` disables persistence.
    pub persist_path: Option<PathBuf>,
    /// How long in-flight requests may run after shutdown starts.
    pub shutdown_grace: Duration,
    /// Maximum accepted request body size.
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Creates a configuration listening on `host:port` with persistence disabled.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            secure: false,
            persist_path: None,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Enables or disables HTTPS.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Sets the snapshot file. An empty path disables persistence.
    pub fn with_persist_path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.persist_path = if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        };
        self
    }

    /// Disables persistence.
    pub fn without_persistence(mut self) -> Self {
        self.persist_path = None;
        self
    }

    /// Sets the shutdown grace period.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Sets the maximum request body size.
    pub fn with_max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    /// Returns `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns `https` when TLS is enabled, `http` otherwise.
    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}
