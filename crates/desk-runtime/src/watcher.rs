use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use anyhow::{Context, Result};
use desk_layout::DeskLayout;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use tracing::{error, info, warn};

/// Keeps the file watcher alive and hands out reloaded layouts.
pub struct LayoutWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
    changes: Receiver<()>,
}

impl LayoutWatcher {
    /// Watch the directory holding `path`; editors often replace files
    /// rather than modify them in place.
    pub fn start(path: &Path) -> Result<Self> {
        let path = path
            .canonicalize()
            .with_context(|| format!("resolving {}", path.display()))?;
        let dir = path
            .parent()
            .context("layout file has no parent directory")?
            .to_path_buf();
        let (tx, changes) = mpsc::channel();
        let target = path.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if (event.kind.is_modify() || event.kind.is_create())
                    && event.paths.iter().any(|p| p == &target)
                {
                    // The receiver only goes away at shutdown.
                    let _ = tx.send(());
                }
            }
            Err(e) => error!("Error watching layout file: {e:?}"),
        })?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        info!(path = %path.display(), "layout watcher started");
        Ok(Self {
            _watcher: watcher,
            path,
            changes,
        })
    }

    /// The latest layout if the file changed since the last call.
    ///
    /// Bursts of events collapse into one reload; a file that fails to
    /// parse is reported and skipped.
    pub fn poll(&self) -> Option<DeskLayout> {
        if self.changes.try_iter().count() == 0 {
            return None;
        }
        match DeskLayout::from_path(&self.path) {
            Ok(layout) => Some(layout),
            Err(e) => {
                warn!("ignoring layout change: {e:#}");
                None
            }
        }
    }
}
