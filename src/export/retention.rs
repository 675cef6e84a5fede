//! Delayed cleanup of export folders
//!
//! Scheduling spawns a detached tokio task that sleeps for the retention
//! delay, then deletes every file under the folder and finally the emptied
//! directories. Scheduled sweeps are not cancellable and cannot be extended;
//! failures are logged and never reach the tool caller.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::RetentionConfig;

/// Schedules deletion of non-persistent export folders
#[derive(Debug, Clone)]
pub struct RetentionSweeper {
    default_persistent: bool,
    delay: Duration,
}

impl RetentionSweeper {
    /// Create a sweeper with explicit defaults
    pub fn new(default_persistent: bool, delay: Duration) -> Self {
        Self {
            default_persistent,
            delay,
        }
    }

    /// Create a sweeper from the retention section of the configuration
    pub fn from_config(config: &RetentionConfig) -> Self {
        Self::new(config.persistent, config.delay())
    }

    /// Schedule deletion of `folder` unless the export is persistent.
    ///
    /// `persistent` overrides the configured default for this call. Returns
    /// the sweep task when one was spawned; dropping the handle does not stop
    /// the sweep.
    pub fn schedule(&self, folder: PathBuf, persistent: Option<bool>) -> Option<JoinHandle<()>> {
        if persistent.unwrap_or(self.default_persistent) {
            tracing::debug!(folder = %folder.display(), "Export marked persistent");
            return None;
        }

        let delay = self.delay;
        tracing::debug!(
            folder = %folder.display(),
            delay_secs = delay.as_secs(),
            "Scheduled export cleanup"
        );
        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            sweep_folder(&folder).await;
        }))
    }
}

/// Delete all files under `folder`, then the folder itself.
async fn sweep_folder(folder: &Path) {
    let mut pending = vec![folder.to_path_buf()];
    let mut dirs = Vec::new();

    while let Some(dir) = pending.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(folder = %dir.display(), error = %e, "Failed to read export folder");
                continue;
            }
        };
        dirs.push(dir);

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to list export folder entry");
                    break;
                }
            };
            let path = entry.path();
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if is_dir {
                pending.push(path);
            } else if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::warn!(file = %path.display(), error = %e, "Failed to delete export file");
            }
        }
    }

    // Children were discovered after their parents; remove deepest first.
    for dir in dirs.iter().rev() {
        if let Err(e) = tokio::fs::remove_dir(dir).await {
            tracing::warn!(folder = %dir.display(), error = %e, "Failed to remove export folder");
        }
    }

    tracing::info!(folder = %folder.display(), "Removed expired export");
}
