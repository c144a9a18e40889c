use std::path::Path;

use sfcc_core::{
    classify, has_cartridge_extension, match_cartridge_file, CartridgePath, FileKind,
};
use walkdir::WalkDir;

use crate::error::{Result, WorkspaceError};

/// Directories never descended into.
const PRUNED_DIRS: &[&str] = &["node_modules", ".git"];

/// Returns whether a workspace-relative path participates in override
/// analysis: it follows the cartridge convention, belongs to a declared
/// cartridge, sits under a recognized source folder, and has a tracked
/// extension.
pub fn is_cartridge_file(path: &str, cartridges: &CartridgePath) -> bool {
    if !has_cartridge_extension(path) {
        return false;
    }
    match_cartridge_file(path).is_some_and(|parsed| {
        cartridges.contains(&parsed.cartridge) && classify(&parsed.relative_path) != FileKind::Unknown
    })
}

/// Walk the workspace and collect cartridge files, sorted, as
/// workspace-relative `/`-separated paths.
pub fn discover_files(root: &Path, cartridges: &CartridgePath) -> Result<Vec<String>> {
    let mut paths = Vec::new();

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        !(entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| PRUNED_DIRS.contains(&name)))
    });

    for entry in walker {
        let entry = entry.map_err(WorkspaceError::Discovery)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");
        if is_cartridge_file(&relative, cartridges) {
            paths.push(relative);
        }
    }

    paths.sort();
    tracing::debug!(
        target = "sfcc.workspace",
        files = paths.len(),
        "workspace discovery complete"
    );
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn collects_only_declared_cartridge_sources() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "src/cartridges/app_custom/cartridge/controllers/Home.js");
        touch(tmp.path(), "src/cartridges/app_custom/cartridge/templates/resources/a.properties");
        // Wrong cartridge, wrong folder, wrong extension.
        touch(tmp.path(), "src/cartridges/plugin_other/cartridge/controllers/X.js");
        touch(tmp.path(), "src/cartridges/app_custom/cartridge/client/js/main.js");
        touch(tmp.path(), "src/cartridges/app_custom/cartridge/controllers/README.md");
        // Not under the cartridge convention at all.
        touch(tmp.path(), "src/lib/helpers.js");

        let cartridges = CartridgePath::parse("app_custom");
        let found = discover_files(tmp.path(), &cartridges).unwrap();
        assert_eq!(
            found,
            vec![
                "src/cartridges/app_custom/cartridge/controllers/Home.js",
                "src/cartridges/app_custom/cartridge/templates/resources/a.properties",
            ]
        );
    }

    #[test]
    fn prunes_node_modules() {
        let tmp = tempfile::tempdir().unwrap();
        touch(
            tmp.path(),
            "node_modules/pkg/cartridges/app_custom/cartridge/scripts/x.js",
        );
        touch(tmp.path(), "src/cartridges/app_custom/cartridge/scripts/y.js");

        let cartridges = CartridgePath::parse("app_custom");
        let found = discover_files(tmp.path(), &cartridges).unwrap();
        assert_eq!(found, vec!["src/cartridges/app_custom/cartridge/scripts/y.js"]);
    }

    #[test]
    fn output_is_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "src/cartridges/a/cartridge/scripts/z.js");
        touch(tmp.path(), "src/cartridges/a/cartridge/models/a.js");

        let cartridges = CartridgePath::parse("a");
        let found = discover_files(tmp.path(), &cartridges).unwrap();
        assert_eq!(
            found,
            vec![
                "src/cartridges/a/cartridge/models/a.js",
                "src/cartridges/a/cartridge/scripts/z.js",
            ]
        );
    }
}
