//! The refresh engine: discovery, indexing, tree construction, and the
//! caching and invalidation policy tying them together.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use sfcc_cache::{CacheConfig, CacheDir};
use sfcc_core::{CartridgePath, OverrideCounts};
use sfcc_ide::{
    build_tree, FsLoader, NodeKind, OverridesPanelModel, PanelEntry, SelectedFile, TreeNode,
    TreeOptions,
};
use sfcc_index::{DiscoveredFile, OverrideIndex};

use crate::discover::discover_files;
use crate::dw;
use crate::error::Result;
use crate::notifier::Notifier;
use crate::settings::Settings;

pub const FILES_SCOPE: &str = "files";
pub const OVERRIDES_SCOPE: &str = "overrides";
const FILE_LIST_KEY: &str = "workspaceFiles";
const CARTRIDGE_PATH_KEY: &str = "cartridgePath";

/// Shared refresh sequence counter.
///
/// Every refresh takes a token at start and checks it before publishing.
/// Anything that invalidates the workspace mid-refresh (the file watcher,
/// another refresh request) bumps the counter, so only the last refresh to
/// start gets to publish its tree.
#[derive(Clone, Debug, Default)]
pub struct RefreshHandle(Arc<AtomicU64>);

impl RefreshHandle {
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The new tree was published.
    Refreshed { files: usize, cartridges: usize },
    /// A newer request started while this one ran; its result was discarded.
    Superseded,
}

pub struct Engine {
    root: PathBuf,
    settings: Settings,
    cartridges: CartridgePath,
    cache: CacheDir,
    notifier: Box<dyn Notifier>,
    panel: OverridesPanelModel,
    tree: Vec<TreeNode>,
    refresh_seq: RefreshHandle,
}

impl Engine {
    pub fn new(
        root: impl Into<PathBuf>,
        settings: Settings,
        notifier: Box<dyn Notifier>,
        cache_config: CacheConfig,
    ) -> Result<Self> {
        let root = root.into();
        let cache = CacheDir::new(&root, cache_config)?;
        let cartridges = settings.cartridges();
        Ok(Self {
            root,
            settings,
            cartridges,
            cache,
            notifier,
            panel: OverridesPanelModel::new(),
            tree: Vec::new(),
            refresh_seq: RefreshHandle::default(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cartridges(&self) -> &CartridgePath {
        &self.cartridges
    }

    /// The last successfully published tree.
    pub fn tree(&self) -> &[TreeNode] {
        &self.tree
    }

    pub fn panel(&self) -> &[PanelEntry] {
        self.panel.entries()
    }

    /// Handle for superseding in-flight refreshes, shared with the watcher.
    pub fn refresh_handle(&self) -> RefreshHandle {
        self.refresh_seq.clone()
    }

    /// Offer to adopt the cartridge path from `dw.json`. On confirmation the
    /// settings change and a full refresh runs.
    pub fn adopt_dw_config(&mut self) -> Result<bool> {
        let declared = dw::adopt_dw_config(
            &self.root,
            &self.settings.cartridge_path,
            self.notifier.as_ref(),
        );
        match declared {
            Some(cartridge_path) => {
                let mut settings = self.settings.clone();
                settings.cartridge_path = cartridge_path;
                self.apply_settings(settings)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Apply new settings, refreshing as the change requires: a cartridge
    /// path change invalidates the cache wholesale, a filter change rebuilds
    /// from cache. Both clear the panel.
    pub fn apply_settings(&mut self, settings: Settings) -> Result<Option<RefreshOutcome>> {
        let path_changed = settings.cartridge_path != self.settings.cartridge_path;
        let filter_changed = settings.overrides_only != self.settings.overrides_only;

        self.settings = settings;
        self.cartridges = self.settings.cartridges();

        if path_changed {
            self.panel.reset();
            self.refresh(false).map(Some)
        } else if filter_changed {
            self.panel.reset();
            self.refresh(true).map(Some)
        } else {
            Ok(None)
        }
    }

    /// A watched cartridge file appeared or disappeared: the cached file list
    /// and counts are stale wholesale.
    pub fn invalidate(&mut self) -> Result<RefreshOutcome> {
        self.panel.reset();
        self.refresh(false)
    }

    /// Rebuild the tree.
    ///
    /// With `use_cache` the file list and per-node counts are served from the
    /// persisted cache when present; a cache-served file list also suppresses
    /// cache writes, so a replayed refresh never dirties the cache it read.
    /// A cache written under a different cartridge path is dropped before
    /// replay. Without `use_cache` both scopes are flushed first. On error
    /// the previously published tree stays in place.
    pub fn refresh(&mut self, use_cache: bool) -> Result<RefreshOutcome> {
        let token = self.refresh_seq.bump();

        let files_scope = self.cache.scope(FILES_SCOPE)?;
        let overrides_scope = self.cache.scope(OVERRIDES_SCOPE)?;

        // The cache outlives the process, so the cartridge path it was
        // written under may no longer be the configured one. Counts keyed for
        // another priority order are wrong in both directions; replay only
        // when the persisted fingerprint matches.
        let fingerprint = files_scope.get::<String>(CARTRIDGE_PATH_KEY);
        let stale = fingerprint.as_deref() != Some(self.settings.cartridge_path.as_str());
        if !use_cache || stale {
            if use_cache && fingerprint.is_some() {
                tracing::debug!(
                    target = "sfcc.workspace",
                    "cartridge path changed since the cache was written, dropping it"
                );
            }
            files_scope.flush()?;
            overrides_scope.flush()?;
        }

        let (paths, replay) = match files_scope.get::<Vec<String>>(FILE_LIST_KEY) {
            Some(paths) => {
                tracing::debug!(
                    target = "sfcc.workspace",
                    files = paths.len(),
                    "replaying cached file list"
                );
                (paths, true)
            }
            None => {
                let paths = discover_files(&self.root, &self.cartridges)?;
                let persisted = files_scope
                    .set(FILE_LIST_KEY, &paths)
                    .and_then(|()| files_scope.set(CARTRIDGE_PATH_KEY, &self.settings.cartridge_path));
                if let Err(err) = persisted {
                    tracing::warn!(
                        target = "sfcc.workspace",
                        error = %err,
                        "failed to persist discovered file list"
                    );
                }
                (paths, false)
            }
        };

        let files: Vec<DiscoveredFile> = paths
            .iter()
            .filter_map(|path| DiscoveredFile::from_workspace_path(path, &self.cartridges))
            .collect();
        let index = OverrideIndex::build(&files);

        // Counts are memoized per rebuild and persisted across rebuilds.
        let mut memo: HashMap<String, OverrideCounts> = HashMap::new();
        let mut lookup = |cartridge: &str, key: Option<&str>| -> OverrideCounts {
            let cache_key = match key {
                Some(key) => format!("{cartridge}::{key}"),
                None => cartridge.to_string(),
            };
            if let Some(counts) = memo.get(&cache_key) {
                return *counts;
            }
            let counts = match overrides_scope.get::<OverrideCounts>(&cache_key) {
                Some(counts) => counts,
                None => {
                    let counts = index.overrides(cartridge, key);
                    if !replay {
                        if let Err(err) = overrides_scope.set(&cache_key, &counts) {
                            tracing::debug!(
                                target = "sfcc.workspace",
                                error = %err,
                                "failed to persist override counts"
                            );
                        }
                    }
                    counts
                }
            };
            memo.insert(cache_key, counts);
            counts
        };

        let tree = build_tree(
            &self.cartridges,
            &files,
            &index,
            &mut lookup,
            TreeOptions {
                overrides_only: self.settings.overrides_only,
            },
        );

        if self.refresh_seq.current() != token {
            tracing::debug!(target = "sfcc.workspace", "discarding superseded refresh");
            return Ok(RefreshOutcome::Superseded);
        }

        for root in &tree {
            if matches!(root.kind, NodeKind::CartridgeRoot { missing: true }) {
                self.notifier.warn(&format!(
                    "Cartridge `{}` is in the cartridge path but missing from the workspace",
                    root.name
                ));
            }
        }
        if !files.is_empty() && index.overridden_paths().next().is_none() {
            self.notifier.info("No cartridge overrides detected");
        }

        tracing::info!(
            target = "sfcc.workspace",
            files = files.len(),
            cartridges = self.cartridges.len(),
            replay,
            "published cartridge tree"
        );
        self.tree = tree;
        Ok(RefreshOutcome::Refreshed {
            files: files.len(),
            cartridges: self.cartridges.len(),
        })
    }

    /// Load the overrides panel for the file node at `path`
    /// (workspace-relative). Returns the panel entries, or `None` when the
    /// path is not a file node in the current tree.
    pub fn open_overrides(&mut self, path: &str) -> Option<&[PanelEntry]> {
        let selected = self.selected_file(path)?;
        let loader = FsLoader::new(&self.root);
        self.panel.load(&selected, &loader);
        Some(self.panel.entries())
    }

    fn selected_file(&self, path: &str) -> Option<SelectedFile> {
        for root in &self.tree {
            if let Some(node) = find_file(&root.children, path) {
                let NodeKind::File {
                    file_kind,
                    occurrences,
                    ..
                } = &node.kind
                else {
                    continue;
                };
                return Some(SelectedFile {
                    cartridge: root.name.clone(),
                    name: node.name.clone(),
                    kind: *file_kind,
                    occurrences: occurrences.clone(),
                });
            }
        }
        None
    }
}

fn find_file<'a>(nodes: &'a [TreeNode], path: &str) -> Option<&'a TreeNode> {
    for node in nodes {
        match &node.kind {
            NodeKind::File { path: node_path, .. } if node_path == path => return Some(node),
            _ => {
                if let Some(found) = find_file(&node.children, path) {
                    return Some(found);
                }
            }
        }
    }
    None
}
