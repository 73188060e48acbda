// Application state module
// Read-only state shared by every connection

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Notify};

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,

    /// Shutdown signal, notified once by the signal handler
    pub shutdown: Arc<Notify>,

    /// Flipped to `true` once the accept loop stops; open connections watch it
    pub closing: watch::Sender<bool>,

    // Cached config values for fast access without locks
    pub cached_access_log: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            shutdown: Arc::new(Notify::new()),
            closing: watch::Sender::new(false),
            cached_access_log: Arc::new(AtomicBool::new(config.logging.access_log)),
        }
    }

    pub fn access_log_enabled(&self) -> bool {
        self.cached_access_log.load(Ordering::Relaxed)
    }
}
