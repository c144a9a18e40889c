//! Whole-forest tree construction from discovered files.
//!
//! One root per declared cartridge, in declared priority order, each carrying
//! a segment trie of its relative paths. Counts come from a caller-supplied
//! lookup so the host can layer memoization or a persisted cache over
//! [`OverrideIndex::overrides`] without this module knowing.

use std::collections::BTreeMap;

use serde::Serialize;
use sfcc_core::{classify, CartridgePath, FileKind, OverrideCounts};
use sfcc_index::{DiscoveredFile, Occurrence, OverrideIndex};

/// Counts lookup: `(cartridge, optional relative key)` to directional counts.
pub type CountsLookup<'a> = &'a mut dyn FnMut(&str, Option<&str>) -> OverrideCounts;

#[derive(Clone, Copy, Debug, Default)]
pub struct TreeOptions {
    /// Hide everything that neither overrides nor is overridden.
    pub overrides_only: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    pub counts: Option<OverrideCounts>,
    pub description: Option<String>,
    pub tooltip: Option<String>,
    pub children: Vec<TreeNode>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    CartridgeRoot {
        missing: bool,
    },
    Folder,
    File {
        path: String,
        file_kind: FileKind,
        /// The full override chain, handed to the panel on activation.
        occurrences: Vec<Occurrence>,
    },
}

impl TreeNode {
    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }
}

/// Build the cartridge forest.
///
/// Roots follow the declared cartridge order. A declared cartridge with no
/// files on disk becomes a `missing` root unless the overrides-only filter is
/// active; with the filter active, any subtree whose counts are zero is
/// dropped entirely.
pub fn build_tree(
    cartridge_path: &CartridgePath,
    files: &[DiscoveredFile],
    index: &OverrideIndex,
    lookup: CountsLookup<'_>,
    options: TreeOptions,
) -> Vec<TreeNode> {
    let mut roots = Vec::new();

    for cartridge in cartridge_path.names() {
        let cartridge_files: Vec<&DiscoveredFile> =
            files.iter().filter(|f| f.cartridge == *cartridge).collect();

        if cartridge_files.is_empty() {
            tracing::warn!(
                target = "sfcc.ide",
                cartridge = %cartridge,
                "declared cartridge has no files in the workspace"
            );
            if !options.overrides_only {
                roots.push(TreeNode {
                    name: cartridge.clone(),
                    kind: NodeKind::CartridgeRoot { missing: true },
                    counts: None,
                    description: None,
                    tooltip: Some("Cartridge not found in workspace".to_string()),
                    children: Vec::new(),
                });
            }
            continue;
        }

        let counts = lookup(cartridge, None);
        if options.overrides_only && counts.is_empty() {
            continue;
        }

        let mut level = Level::default();
        for file in &cartridge_files {
            insert_file(&mut level, file, index, lookup);
        }

        let (description, tooltip) = describe(&counts);
        roots.push(TreeNode {
            name: cartridge.clone(),
            kind: NodeKind::CartridgeRoot { missing: false },
            counts: Some(counts),
            description,
            tooltip,
            children: finalize(level, options),
        });
    }

    roots
}

/// Intermediate trie level. Folder children are keyed by name; file nodes are
/// built eagerly since all their data is known at insert time.
#[derive(Default)]
struct Level {
    folders: BTreeMap<String, (OverrideCounts, Level)>,
    files: Vec<TreeNode>,
}

fn insert_file(
    root: &mut Level,
    file: &DiscoveredFile,
    index: &OverrideIndex,
    lookup: CountsLookup<'_>,
) {
    // `path` ends with `relative_path`; the prefix before it scopes relative
    // keys to this cartridge's subtree of the workspace.
    let base_len = file.path.len() - file.relative_path.len();
    let base = &file.path[..base_len];

    let segments: Vec<&str> = file.relative_path.split('/').collect();
    let mut level = root;
    for (depth, segment) in segments.iter().enumerate() {
        let relative_key = format!("{base}{}", segments[..=depth].join("/"));

        if depth + 1 == segments.len() {
            let counts = lookup(&file.cartridge, Some(&relative_key));
            let (description, tooltip) = describe(&counts);
            level.files.push(TreeNode {
                name: segment.to_string(),
                kind: NodeKind::File {
                    path: file.path.clone(),
                    file_kind: classify(&file.relative_path),
                    occurrences: index
                        .occurrences(&file.relative_path)
                        .map(<[Occurrence]>::to_vec)
                        .unwrap_or_default(),
                },
                counts: Some(counts),
                description,
                tooltip,
                children: Vec::new(),
            });
        } else {
            let entry = level
                .folders
                .entry(segment.to_string())
                .or_insert_with(|| (lookup(&file.cartridge, Some(&relative_key)), Level::default()));
            level = &mut entry.1;
        }
    }
}

/// Flatten a trie level: folders first in name order, then files in name
/// order, applying the overrides-only filter.
fn finalize(level: Level, options: TreeOptions) -> Vec<TreeNode> {
    let mut nodes = Vec::new();

    for (name, (counts, inner)) in level.folders {
        if options.overrides_only && counts.is_empty() {
            continue;
        }
        let (description, tooltip) = describe(&counts);
        nodes.push(TreeNode {
            name,
            kind: NodeKind::Folder,
            counts: Some(counts),
            description,
            tooltip,
            children: finalize(inner, options),
        });
    }

    let mut files: Vec<TreeNode> = level
        .files
        .into_iter()
        .filter(|node| {
            !options.overrides_only || node.counts.is_some_and(|counts| !counts.is_empty())
        })
        .collect();
    files.sort_by(|a, b| a.name.cmp(&b.name));
    nodes.extend(files);

    nodes
}

/// Render counts into the label suffix and hover text.
fn describe(counts: &OverrideCounts) -> (Option<String>, Option<String>) {
    let mut description = Vec::new();
    let mut tooltip = Vec::new();

    if counts.above > 0 {
        let n = counts.above;
        description.push(format!("↑ {n}"));
        tooltip.push(format!(
            "↑ {n} Cartridge Override{} Above",
            if n > 1 { "s" } else { "" }
        ));
    }
    if counts.below > 0 {
        let n = counts.below;
        description.push(format!("↓ {n}"));
        tooltip.push(format!(
            "↓ Overrides {n} Cartridge{} Below",
            if n > 1 { "s" } else { "" }
        ));
    }

    let join = |parts: Vec<String>| {
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    };
    (join(description), join(tooltip))
}
