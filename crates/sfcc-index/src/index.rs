use std::collections::BTreeMap;

use sfcc_core::OverrideCounts;

use crate::{DiscoveredFile, Occurrence};

/// Mapping from cartridge-relative path to its ordered occurrence chain.
///
/// A chain of length one is not an override; a chain of length two or more
/// is, and is the ground truth for every override count in the tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverrideIndex {
    groups: BTreeMap<String, Vec<Occurrence>>,
}

impl OverrideIndex {
    /// Group discovered files by relative path, each chain sorted ascending
    /// by cartridge-path position (highest priority first).
    pub fn build(files: &[DiscoveredFile]) -> Self {
        let mut groups: BTreeMap<String, Vec<Occurrence>> = BTreeMap::new();
        for file in files {
            groups
                .entry(file.relative_path.clone())
                .or_default()
                .push(Occurrence::from(file));
        }
        for chain in groups.values_mut() {
            chain.sort_by_key(|occurrence| occurrence.position);
        }

        let overridden = groups.values().filter(|chain| chain.len() > 1).count();
        tracing::debug!(
            target = "sfcc.index",
            groups = groups.len(),
            overridden,
            "built override index"
        );

        Self { groups }
    }

    /// Override counts for `cartridge`, optionally narrowed to occurrences
    /// whose workspace path contains `relative_key` (a folder- or file-level
    /// path prefix).
    ///
    /// A group qualifies when it has at least two occurrences and one of them
    /// belongs to `cartridge`. `above`/`below` increment at most once per
    /// qualifying group: the test is "any rival occurrence on that side", not
    /// a per-rival count.
    pub fn overrides(&self, cartridge: &str, relative_key: Option<&str>) -> OverrideCounts {
        let mut counts = OverrideCounts::default();

        for chain in self.groups.values() {
            if chain.len() < 2 {
                continue;
            }
            let Some(own) = chain.iter().find(|o| o.cartridge == cartridge) else {
                continue;
            };
            if let Some(key) = relative_key {
                if !own.path.contains(key) {
                    continue;
                }
            }

            counts.total += 1;
            if chain
                .iter()
                .any(|o| o.cartridge != cartridge && o.position < own.position)
            {
                counts.above += 1;
            }
            if chain
                .iter()
                .any(|o| o.cartridge != cartridge && o.position > own.position)
            {
                counts.below += 1;
            }
        }

        counts
    }

    /// The ordered occurrence chain for one relative path, if known.
    pub fn occurrences(&self, relative_path: &str) -> Option<&[Occurrence]> {
        self.groups.get(relative_path).map(Vec::as_slice)
    }

    /// Relative paths overridden in more than one cartridge.
    pub fn overridden_paths(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .filter(|(_, chain)| chain.len() > 1)
            .map(|(path, _)| path.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
