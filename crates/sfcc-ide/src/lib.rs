//! Presentation-side analysis for cartridge overrides.
//!
//! Turns the override index into the two views a host renders: the cartridge
//! tree (one root per declared cartridge, counts on every node) and the
//! overrides panel (one file's override stack, with controller routes and
//! properties keys resolved from source text). Everything here is data; the
//! host owns widgets, icons, and file opening.

mod diff;
mod panel;
mod scan;
mod tree;

pub use diff::{diff_request, DiffRequest};
pub use panel::{
    EntryIcon, NavigationTarget, OverridesPanelModel, PanelChild, PanelEntry, SelectedFile,
};
pub use scan::{scan_properties, scan_routes, FsLoader, PropertyKey, Route, SourceLoader};
pub use tree::{build_tree, CountsLookup, NodeKind, TreeNode, TreeOptions};
