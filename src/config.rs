//! Server configuration.
//!
//! Every field has a default, so an empty (or absent) file yields the stock
//! server: port 8080, document root `pages`, 32 workers, 5 second idle timeout.
//!
//! ```yaml
//! server:
//!   listen_addr: "127.0.0.1:8080"
//!   idle_timeout_secs: 5
//! static_files:
//!   root: "./pages"
//! pool:
//!   workers: 32
//!   queue_capacity: 1024
//!   admission: block
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Path of the YAML config file, if any.
pub const CONFIG_ENV: &str = "PAGESERVE_CONFIG";
/// Overrides `server.listen_addr`.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Seconds a keep-alive connection may sit without sending a request.
    pub idle_timeout_secs: f64,
    /// Capacity of the per-connection read buffer. A request head that does
    /// not fit is rejected with 400.
    pub max_head_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            idle_timeout_secs: 5.0,
            max_head_bytes: 1024,
        }
    }
}

impl ServerConfig {
    /// Out-of-range values saturate; `Config::validate` rejects them.
    pub fn idle_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.idle_timeout_secs).unwrap_or(Duration::MAX)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Document root.
    pub root: PathBuf,
    /// 404 page, relative to `root`.
    pub error_page: PathBuf,
    /// Largest page held in memory for a single response.
    pub max_body_bytes: usize,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("pages"),
            error_page: PathBuf::from("error.html"),
            max_body_bytes: 64 * 1024,
        }
    }
}

impl StaticFilesConfig {
    pub fn error_page_path(&self) -> PathBuf {
        self.root.join(&self.error_page)
    }
}

/// What the acceptor does when the worker queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Admission {
    /// Wait for a free slot before accepting more connections.
    Block,
    /// Answer 503 and close.
    Reject,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub workers: usize,
    pub queue_capacity: usize,
    pub admission: Admission,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 32,
            queue_capacity: 1024,
            admission: Admission::Block,
        }
    }
}

impl Config {
    /// Loads the file named by `PAGESERVE_CONFIG` (defaults when unset), then
    /// applies the `LISTEN` override.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        if let Ok(addr) = std::env::var(LISTEN_ENV) {
            cfg.server.listen_addr = addr;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.pool.workers == 0 {
            anyhow::bail!("pool.workers must be >= 1");
        }
        if self.pool.queue_capacity == 0 {
            anyhow::bail!("pool.queue_capacity must be >= 1");
        }
        let idle = self.server.idle_timeout_secs;
        match Duration::try_from_secs_f64(idle) {
            Ok(d) if !d.is_zero() => {}
            _ => anyhow::bail!(
                "server.idle_timeout_secs must be a positive number of seconds, got {idle}"
            ),
        }
        if self.server.max_head_bytes < 4 {
            anyhow::bail!("server.max_head_bytes must be >= 4");
        }
        Ok(())
    }
}
