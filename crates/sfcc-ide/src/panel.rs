//! The overrides panel: a flat model of one file's override stack.
//!
//! Activating a file in the cartridge tree hands its occurrence chain here.
//! Controllers get one parent per occurrence with the routes that cartridge
//! registers as children; `.properties` templates get their overridden keys
//! as children; everything else renders the stack flat. The panel never opens
//! files itself, it only carries navigation targets.

use serde::Serialize;
use sfcc_core::FileKind;
use sfcc_index::Occurrence;

use crate::scan::{scan_properties, scan_routes, SourceLoader};

/// The file a developer activated, with its full override chain.
#[derive(Clone, Debug)]
pub struct SelectedFile {
    /// Cartridge of the tree node that was activated.
    pub cartridge: String,
    /// Display name (the file name, e.g. `Home.js`).
    pub name: String,
    pub kind: FileKind,
    /// Occurrence chain in priority order, highest first.
    pub occurrences: Vec<Occurrence>,
}

/// Where activating an entry should take the editor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavigationTarget {
    pub path: String,
    /// 1-based line to select, when known.
    pub line: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryIcon {
    /// Bottom of the stack, drawn with the file-type icon.
    Source(FileKind),
    /// An occurrence shadowing one below it.
    Override,
    Route,
    Property,
}

/// A route or property key nested under a stack entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PanelChild {
    pub name: String,
    pub description: Option<String>,
    pub tooltip: Option<String>,
    pub icon: EntryIcon,
    pub target: NavigationTarget,
}

/// One occurrence of the selected file's override stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PanelEntry {
    pub name: String,
    /// The owning cartridge.
    pub description: String,
    pub is_selected: bool,
    /// Index in the occurrence chain; the diff helper orders by this.
    pub sort_order: usize,
    pub icon: EntryIcon,
    /// Present when the entry itself is openable (no children).
    pub target: Option<NavigationTarget>,
    pub children: Vec<PanelChild>,
}

/// Panel state. Reloading the file that is already shown is a no-op so tree
/// selection events don't rebuild the panel on every click.
#[derive(Debug, Default)]
pub struct OverridesPanelModel {
    last_opened: Option<String>,
    entries: Vec<PanelEntry>,
}

impl OverridesPanelModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[PanelEntry] {
        &self.entries
    }

    /// Clear the panel. Called when the tree is rebuilt or configuration
    /// changes; also forgets the last-opened guard so the same file can be
    /// shown again afterwards.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.last_opened = None;
    }

    /// Populate the panel for `file`. Returns `false` when the file is the
    /// one already shown and nothing changed.
    pub fn load(&mut self, file: &SelectedFile, loader: &dyn SourceLoader) -> bool {
        let key = format!("{}_{}", file.cartridge, file.name.replace(['/', '.'], "-"));
        if self.last_opened.as_deref() == Some(key.as_str()) {
            return false;
        }

        self.entries = match file.kind {
            FileKind::Controller => controller_entries(file, loader),
            FileKind::Template if file.name.rsplit('.').next() == Some("properties") => {
                properties_entries(file, loader)
            }
            _ => flat_entries(file),
        };
        self.last_opened = Some(key);
        true
    }
}

fn stack_icon(index: usize, chain_len: usize, kind: FileKind) -> EntryIcon {
    if index + 1 == chain_len {
        EntryIcon::Source(kind)
    } else {
        EntryIcon::Override
    }
}

fn flat_entries(file: &SelectedFile) -> Vec<PanelEntry> {
    let chain_len = file.occurrences.len();
    file.occurrences
        .iter()
        .enumerate()
        .map(|(index, occurrence)| PanelEntry {
            name: file.name.clone(),
            description: occurrence.cartridge.clone(),
            is_selected: file.cartridge == occurrence.cartridge,
            sort_order: index,
            icon: stack_icon(index, chain_len, file.kind),
            target: Some(NavigationTarget {
                path: occurrence.path.clone(),
                line: None,
            }),
            children: Vec::new(),
        })
        .collect()
}

fn controller_entries(file: &SelectedFile, loader: &dyn SourceLoader) -> Vec<PanelEntry> {
    let routes = scan_routes(&file.occurrences, loader);
    let chain_len = file.occurrences.len();
    let display_name = file.name.strip_suffix(".js").unwrap_or(&file.name);

    file.occurrences
        .iter()
        .enumerate()
        .map(|(index, occurrence)| {
            let children: Vec<PanelChild> = routes
                .iter()
                .filter(|route| route.cartridge == occurrence.cartridge)
                .map(|route| PanelChild {
                    name: route.name.clone(),
                    description: Some(route.verb.clone()),
                    tooltip: Some(route.tooltip()),
                    icon: EntryIcon::Route,
                    target: NavigationTarget {
                        path: route.path.clone(),
                        line: route.line,
                    },
                })
                .collect();

            let target = children.is_empty().then(|| NavigationTarget {
                path: occurrence.path.clone(),
                line: None,
            });

            PanelEntry {
                name: display_name.to_string(),
                description: occurrence.cartridge.clone(),
                is_selected: file.cartridge == occurrence.cartridge,
                sort_order: index,
                icon: stack_icon(index, chain_len, FileKind::Controller),
                target,
                children,
            }
        })
        .collect()
}

fn properties_entries(file: &SelectedFile, loader: &dyn SourceLoader) -> Vec<PanelEntry> {
    let keys = scan_properties(&file.occurrences, loader);
    let chain_len = file.occurrences.len();

    file.occurrences
        .iter()
        .enumerate()
        .map(|(index, occurrence)| {
            let children: Vec<PanelChild> = keys
                .iter()
                .filter(|key| key.cartridge == occurrence.cartridge)
                .map(|key| PanelChild {
                    name: key.key.clone(),
                    description: None,
                    tooltip: None,
                    icon: EntryIcon::Property,
                    target: NavigationTarget {
                        path: key.path.clone(),
                        line: Some(key.line),
                    },
                })
                .collect();

            let target = children.is_empty().then(|| NavigationTarget {
                path: occurrence.path.clone(),
                line: None,
            });

            PanelEntry {
                name: file.name.clone(),
                description: occurrence.cartridge.clone(),
                is_selected: file.cartridge == occurrence.cartridge,
                sort_order: index,
                icon: stack_icon(index, chain_len, FileKind::Template),
                target,
                children,
            }
        })
        .collect()
}
