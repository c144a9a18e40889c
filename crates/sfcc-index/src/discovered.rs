use serde::{Deserialize, Serialize};
use sfcc_core::{match_cartridge_file, CartridgePath};

/// A cartridge file found during workspace discovery.
///
/// `path` is workspace-relative with `/` separators; `position` is the
/// cartridge's index in the [`CartridgePath`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredFile {
    pub cartridge: String,
    pub relative_path: String,
    pub position: usize,
    pub path: String,
}

impl DiscoveredFile {
    /// Interpret a workspace-relative path as a cartridge file.
    ///
    /// Returns `None` when the path does not follow the cartridge directory
    /// convention, or when its cartridge is not declared in the path —
    /// such files are present on disk but must not participate in indexing.
    pub fn from_workspace_path(path: &str, cartridge_path: &CartridgePath) -> Option<Self> {
        let parsed = match_cartridge_file(path)?;
        let position = cartridge_path.position(&parsed.cartridge)?;
        Some(Self {
            cartridge: parsed.cartridge,
            relative_path: parsed.relative_path,
            position,
            path: path.replace('\\', "/"),
        })
    }

    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

/// One cartridge's entry in an override chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub cartridge: String,
    pub position: usize,
    pub path: String,
}

impl From<&DiscoveredFile> for Occurrence {
    fn from(file: &DiscoveredFile) -> Self {
        Self {
            cartridge: file.cartridge.clone(),
            position: file.position,
            path: file.path.clone(),
        }
    }
}
