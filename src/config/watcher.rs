//! Reloadable retention config
//!
//! The retention file is re-read on its own interval; a cycle only ever sees
//! the snapshot that was current when it started.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::{ConfigError, RetentionConfig};

/// Source of retention config snapshots
pub trait ConfigProvider: Send + Sync {
    /// The latest usable snapshot
    fn snapshot(&self) -> Arc<RetentionConfig>;
}

/// A fixed snapshot never changes
impl ConfigProvider for RetentionConfig {
    fn snapshot(&self) -> Arc<RetentionConfig> {
        Arc::new(self.clone())
    }
}

/// Keeps the last good copy of the retention file
#[derive(Debug)]
pub struct ConfigWatcher {
    path: PathBuf,
    current: RwLock<Arc<RetentionConfig>>,
}

impl ConfigWatcher {
    /// Load the file once. Fails if there is no usable snapshot to start from.
    pub fn load(path: &Path) -> Result<Arc<Self>, ConfigError> {
        let config = RetentionConfig::load(path)?;
        info!(
            path = %path.display(),
            users = config.users.len(),
            "Retention config loaded"
        );

        Ok(Arc::new(Self {
            path: path.to_path_buf(),
            current: RwLock::new(Arc::new(config)),
        }))
    }

    /// Re-read the file, replacing the snapshot only when the new one is valid.
    ///
    /// Returns whether the snapshot changed.
    pub fn reload(&self) -> Result<bool, ConfigError> {
        let config = RetentionConfig::load(&self.path)?;

        let mut current = self.current.write();
        if **current == config {
            return Ok(false);
        }
        *current = Arc::new(config);
        Ok(true)
    }

    /// Reload on a fixed interval until the runtime shuts down
    pub fn spawn_reloader(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let watcher = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; the file was just loaded
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match watcher.reload() {
                    Ok(true) => info!(path = %watcher.path.display(), "Retention config reloaded"),
                    Ok(false) => debug!(path = %watcher.path.display(), "Retention config unchanged"),
                    Err(e) => warn!(
                        path = %watcher.path.display(),
                        error = %e,
                        "Failed to reload retention config, keeping previous snapshot"
                    ),
                }
            }
        })
    }
}

impl ConfigProvider for ConfigWatcher {
    fn snapshot(&self) -> Arc<RetentionConfig> {
        Arc::clone(&self.current.read())
    }
}
