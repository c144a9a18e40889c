//! Core shared types for SFCC cartridge override analysis.
//!
//! This crate is intentionally small and dependency-light: the cartridge path
//! model, the cartridge file-path matcher, the file-type classifier, and the
//! override counts that every other crate builds on.

mod cartridge_path;
mod classify;
mod counts;
mod paths;

pub use cartridge_path::CartridgePath;
pub use classify::{classify, FileKind, SOURCE_DIRS};
pub use counts::OverrideCounts;
pub use paths::{match_cartridge_file, split_segments, CartridgeFilePath};

/// File extensions that participate in override resolution.
pub const CARTRIDGE_EXTENSIONS: &[&str] = &["js", "ds", "isml", "properties"];

/// Returns whether `path` ends in one of the tracked cartridge extensions.
pub fn has_cartridge_extension(path: &str) -> bool {
    path.rsplit('.')
        .next()
        .is_some_and(|ext| CARTRIDGE_EXTENSIONS.contains(&ext))
}
