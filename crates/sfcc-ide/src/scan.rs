//! Text scanners backing the overrides panel.
//!
//! Both scanners walk an occurrence chain in reverse priority order (base
//! cartridge first) so that the first hit for a key comes from the bottom of
//! the override stack, the way the code actually executes on the platform.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use sfcc_index::Occurrence;

/// Provides file contents for workspace-relative paths.
///
/// A `None` return skips the occurrence instead of failing the scan; a file
/// can legitimately disappear between discovery and the panel opening.
pub trait SourceLoader {
    fn load(&self, path: &str) -> Option<String>;
}

/// Loads workspace-relative paths from disk under a fixed root.
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SourceLoader for FsLoader {
    fn load(&self, path: &str) -> Option<String> {
        std::fs::read_to_string(self.root.join(path)).ok()
    }
}

static ROUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    // An optional non-quote run before the route name tolerates middleware or
    // callback arguments appearing ahead of the quoted string.
    Regex::new(r#"server\.(get|post|use|append|prepend|replace)\(([^'"]+)?['"]([^'"]+)['"]"#)
        .unwrap()
});

/// One `server.<verb>('Name', ...)` registration found in a controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Route {
    pub verb: String,
    pub name: String,
    pub cartridge: String,
    pub path: String,
    /// 1-based, `None` when the registration could not be located by line.
    pub line: Option<u32>,
}

impl Route {
    pub fn tooltip(&self) -> String {
        format!("server.{}('{}')", self.verb, self.name)
    }
}

/// Scan a controller's occurrence chain for route registrations.
///
/// The first registration per `(verb, cartridge)` wins; unreadable files skip
/// their occurrence.
pub fn scan_routes(occurrences: &[Occurrence], loader: &dyn SourceLoader) -> Vec<Route> {
    let mut routes = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for occurrence in occurrences.iter().rev() {
        let Some(text) = loader.load(&occurrence.path) else {
            tracing::debug!(
                target = "sfcc.ide",
                path = %occurrence.path,
                "skipping unreadable controller"
            );
            continue;
        };
        let lines: Vec<&str> = text.split('\n').collect();

        for captures in ROUTE_RE.captures_iter(&text) {
            let verb = &captures[1];
            let name = &captures[3];
            if !seen.insert((verb.to_string(), occurrence.cartridge.clone())) {
                continue;
            }
            routes.push(Route {
                verb: verb.to_string(),
                name: name.to_string(),
                cartridge: occurrence.cartridge.clone(),
                path: occurrence.path.clone(),
                line: resolve_route_line(&lines, verb, name),
            });
        }
    }

    routes
}

/// Find the 1-based line of a route registration.
///
/// Some formatters wrap the route name onto the line after `server.<verb>(`,
/// so the name may match on the line itself or the one immediately below.
fn resolve_route_line(lines: &[&str], verb: &str, name: &str) -> Option<u32> {
    let needle = format!("server.{verb}");
    for (i, line) in lines.iter().enumerate() {
        if line.contains(&needle)
            && (line.contains(name) || lines.get(i + 1).is_some_and(|next| next.contains(name)))
        {
            return Some(i as u32 + 1);
        }
    }
    None
}

/// One key definition found in a `.properties` file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PropertyKey {
    pub key: String,
    pub cartridge: String,
    pub path: String,
    /// 1-based line of the definition.
    pub line: u32,
}

/// Scan a properties file's occurrence chain for overridden keys.
///
/// Every line containing `=` defines a key (text before the first `=`,
/// trimmed). The first definition per `(key, cartridge)` wins, and keys
/// defined in fewer than two distinct cartridges are dropped: the panel only
/// shows keys that actually shadow something.
pub fn scan_properties(occurrences: &[Occurrence], loader: &dyn SourceLoader) -> Vec<PropertyKey> {
    let mut keys = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for occurrence in occurrences.iter().rev() {
        let Some(text) = loader.load(&occurrence.path) else {
            tracing::debug!(
                target = "sfcc.ide",
                path = %occurrence.path,
                "skipping unreadable properties file"
            );
            continue;
        };

        for (i, line) in text.split('\n').enumerate() {
            let Some((raw_key, _)) = line.split_once('=') else {
                continue;
            };
            let key = raw_key.trim();
            if !seen.insert((key.to_string(), occurrence.cartridge.clone())) {
                continue;
            }
            keys.push(PropertyKey {
                key: key.to_string(),
                cartridge: occurrence.cartridge.clone(),
                path: occurrence.path.clone(),
                line: i as u32 + 1,
            });
        }
    }

    // Entries are already unique per (key, cartridge), so the entry count per
    // key is the distinct-cartridge count.
    let mut cartridges_per_key: HashMap<&str, usize> = HashMap::new();
    for entry in &keys {
        *cartridges_per_key.entry(entry.key.as_str()).or_default() += 1;
    }

    keys.iter()
        .filter(|entry| cartridges_per_key[entry.key.as_str()] >= 2)
        .cloned()
        .collect()
}
