use serde::{Deserialize, Serialize};

/// Directional override counts for a cartridge root, folder, or file node.
///
/// `total` counts relative paths that exist in more than one cartridge and
/// include this one. `above` counts those paths where some higher-priority
/// cartridge shadows this one; `below` counts those where this cartridge
/// shadows a lower-priority one. A path can contribute to both sides, so
/// `above <= total` and `below <= total` but their sum may exceed `total`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideCounts {
    pub above: usize,
    pub below: usize,
    pub total: usize,
}

impl OverrideCounts {
    pub const fn new(above: usize, below: usize, total: usize) -> Self {
        Self { above, below, total }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
