//! Workspace integration for cartridge override analysis.
//!
//! Ties discovery, the override index, the persisted cache, and the tree and
//! panel models into one engine a host drives: apply settings, refresh, open
//! a file's override stack, react to filesystem changes. Hosts plug in
//! through two seams, [`Notifier`] for messages and confirmations, and the
//! navigation targets carried on tree and panel entries.

mod discover;
mod dw;
mod engine;
mod error;
mod notifier;
mod settings;
mod watch;

pub use discover::{discover_files, is_cartridge_file};
pub use dw::adopt_dw_config;
pub use engine::{Engine, RefreshHandle, RefreshOutcome, FILES_SCOPE, OVERRIDES_SCOPE};
pub use error::{Result, WorkspaceError};
pub use notifier::{Notifier, SilentNotifier};
pub use settings::Settings;
pub use watch::{Invalidation, WorkspaceWatcher};
