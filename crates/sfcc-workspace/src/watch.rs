//! File watching.
//!
//! Create/delete of any cartridge source file invalidates the cached file
//! list and counts wholesale. The watcher filters raw filesystem events down
//! to those files, bumps the refresh handle so an in-flight refresh is
//! superseded, and forwards the path for the host loop to act on.

use std::path::{Path, PathBuf};

use crossbeam_channel::{unbounded, Receiver};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use sfcc_core::{classify, has_cartridge_extension, match_cartridge_file, FileKind};

use crate::engine::RefreshHandle;
use crate::error::Result;

/// A cartridge source file appeared or disappeared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invalidation {
    /// Workspace-relative, `/`-separated.
    pub path: String,
}

pub struct WorkspaceWatcher {
    receiver: Receiver<Invalidation>,
    // Dropping the watcher stops the native watch.
    _watcher: RecommendedWatcher,
}

impl WorkspaceWatcher {
    /// Watch `root` recursively. Events arrive on [`Self::events`] after the
    /// refresh handle has been bumped.
    pub fn new(root: &Path, refresh: RefreshHandle) -> Result<Self> {
        let (sender, receiver) = unbounded();
        let watched_root: PathBuf = root.to_path_buf();

        let mut watcher = notify::recommended_watcher(move |event: notify::Result<Event>| {
            let event = match event {
                Ok(event) => event,
                Err(err) => {
                    tracing::warn!(target = "sfcc.workspace", error = %err, "watch error");
                    return;
                }
            };
            if !matches!(event.kind, EventKind::Create(_) | EventKind::Remove(_)) {
                return;
            }
            for path in &event.paths {
                let relative = normalize(&watched_root, path);
                if is_watched(&relative) {
                    refresh.bump();
                    let _ = sender.send(Invalidation { path: relative });
                }
            }
        })?;
        watcher.watch(root, RecursiveMode::Recursive)?;

        Ok(Self {
            receiver,
            _watcher: watcher,
        })
    }

    pub fn events(&self) -> &Receiver<Invalidation> {
        &self.receiver
    }
}

fn normalize(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn is_watched(path: &str) -> bool {
    has_cartridge_extension(path)
        && match_cartridge_file(path)
            .is_some_and(|parsed| classify(&parsed.relative_path) != FileKind::Unknown)
}
