//! The override-resolution index.
//!
//! Discovered cartridge files are grouped by their cartridge-relative path;
//! a relative path present in two or more cartridges is an override chain,
//! and directional counts (`above`/`below`) are derived from each chain
//! against the cartridge priority order.

mod discovered;
mod index;

pub use discovered::{DiscoveredFile, Occurrence};
pub use index::OverrideIndex;
