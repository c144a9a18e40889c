use serde::{Deserialize, Serialize};

use crate::paths::split_segments;

/// Top-level cartridge folders that participate in override analysis.
pub const SOURCE_DIRS: &[&str] = &["controllers", "models", "scripts", "templates"];

/// Kind of a cartridge file, derived from the top-level folder it sits under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Controller,
    Model,
    Script,
    Template,
    Unknown,
}

impl FileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Controller => "controller",
            FileKind::Model => "model",
            FileKind::Script => "script",
            FileKind::Template => "template",
            FileKind::Unknown => "unknown",
        }
    }
}

/// Classify a cartridge-relative path by its first segment.
///
/// The match is an exact segment comparison, not substring containment: a
/// path like `scripts/controllers-util/helper.js` is a script, and a file
/// named after one of the folders does not change kind.
pub fn classify(relative_path: &str) -> FileKind {
    match split_segments(relative_path).next().unwrap_or("") {
        "controllers" => FileKind::Controller,
        "models" => FileKind::Model,
        "scripts" => FileKind::Script,
        "templates" => FileKind::Template,
        _ => FileKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_first_segment() {
        assert_eq!(classify("controllers/Home.js"), FileKind::Controller);
        assert_eq!(classify("models/product.js"), FileKind::Model);
        assert_eq!(classify("scripts/util/date.ds"), FileKind::Script);
        assert_eq!(
            classify("templates/resources/checkout.properties"),
            FileKind::Template
        );
        assert_eq!(classify("client/js/main.js"), FileKind::Unknown);
    }

    #[test]
    fn segment_match_is_exact() {
        // Substring containment used to misclassify these.
        assert_eq!(classify("scripts/controllers/helper.js"), FileKind::Script);
        assert_eq!(classify("controllers-v2/Home.js"), FileKind::Unknown);
        assert_eq!(classify("lib/controllers/Home.js"), FileKind::Unknown);
    }

    #[test]
    fn backslash_paths_classify_identically() {
        assert_eq!(classify(r"controllers\Home.js"), FileKind::Controller);
    }
}
