use serde::{Deserialize, Serialize};
use sfcc_core::CartridgePath;

/// Host-provided configuration for one workspace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Colon-separated cartridge priority list, highest priority first.
    pub cartridge_path: String,
    /// Hide tree nodes that neither override nor are overridden.
    pub overrides_only: bool,
}

impl Settings {
    pub fn cartridges(&self) -> CartridgePath {
        CartridgePath::parse(&self.cartridge_path)
    }
}
