//! Configuration file watcher for hot reload.
//!
//! Watches the directory holding the config file so that editors which
//! replace the file by rename are still seen. Bursts of events are
//! collapsed into one reload, and a reload that yields the configuration
//! already in service is not forwarded.

use std::path::{Path, PathBuf};
use std::sync::mpsc as std_mpsc;
use std::thread;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::BridgeConfig;

/// Quiet period after the last file event before reloading.
const SETTLE: Duration = Duration::from_millis(200);

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    current: BridgeConfig,
    update_tx: mpsc::UnboundedSender<BridgeConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher for `path`, which currently holds `current`.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path, current: BridgeConfig) -> (Self, mpsc::UnboundedReceiver<BridgeConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        (
            Self {
                path,
                current,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file.
    ///
    /// The returned watcher must be kept alive for updates to keep flowing;
    /// dropping it also stops the reload thread.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let (event_tx, event_rx) = std_mpsc::channel();
        let file = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event)
                    if (event.kind.is_modify() || event.kind.is_create())
                        && event.paths.iter().any(|p| p == &file) =>
                {
                    let _ = event_tx.send(());
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?self.path, "Config watcher started");

        thread::Builder::new()
            .name("config-reload".into())
            .spawn(move || self.reload_on(event_rx))
            .map_err(notify::Error::io)?;

        Ok(watcher)
    }

    fn reload_on(mut self, events: std_mpsc::Receiver<()>) {
        while events.recv().is_ok() {
            while events.recv_timeout(SETTLE).is_ok() {}

            if let Some(config) = self.reload() {
                if self.update_tx.send(config).is_err() {
                    break;
                }
            }
        }
        tracing::debug!(path = ?self.path, "Config watcher stopped");
    }

    /// Load the file again; `Some` only when it parses, validates and
    /// differs from the configuration last handed out.
    fn reload(&mut self) -> Option<BridgeConfig> {
        match load_config(&self.path) {
            Ok(config) if config == self.current => {
                tracing::debug!(path = ?self.path, "Config file touched without changes");
                None
            }
            Ok(config) => {
                tracing::info!(path = ?self.path, "Config file changed, reloading");
                self.current = config.clone();
                Some(config)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INITIAL: &str = "[listener]\nbind_address = \"127.0.0.1:9001\"\n";
    const CHANGED: &str = "[listener]\nbind_address = \"127.0.0.1:9002\"\n";

    fn config_file(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_reload_skips_unchanged_config() {
        let (_dir, path) = config_file(INITIAL);
        let (mut watcher, _rx) = ConfigWatcher::new(&path, load_config(&path).unwrap());

        assert!(watcher.reload().is_none());

        std::fs::write(&path, CHANGED).unwrap();
        let config = watcher.reload().unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9002");
        assert!(watcher.reload().is_none());
    }

    #[test]
    fn test_reload_keeps_current_on_invalid_file() {
        let (_dir, path) = config_file(INITIAL);
        let (mut watcher, _rx) = ConfigWatcher::new(&path, load_config(&path).unwrap());

        std::fs::write(&path, "[forward]\nmax_depth = 0\n").unwrap();
        assert!(watcher.reload().is_none());
        assert_eq!(watcher.current.listener.bind_address, "127.0.0.1:9001");
    }

    #[tokio::test]
    async fn test_file_change_delivers_config() {
        let (_dir, path) = config_file(INITIAL);
        let (watcher, mut rx) = ConfigWatcher::new(&path, load_config(&path).unwrap());
        let _watcher = watcher.run().unwrap();

        std::fs::write(&path, CHANGED).unwrap();

        let config = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no config update within 5s")
            .expect("watcher channel closed");
        assert_eq!(config.listener.bind_address, "127.0.0.1:9002");
    }
}
