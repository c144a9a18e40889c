use std::fmt;

/// Cartridges that are stripped from the configured path before analysis.
///
/// `modules` is a shared pseudo-cartridge on SFCC projects and never
/// participates in override resolution.
const IGNORED_CARTRIDGES: &[&str] = &["modules"];

/// The ordered cartridge priority list.
///
/// Index 0 is the highest-priority cartridge (leftmost in the configured
/// colon-separated path). The list is immutable for the duration of one scan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CartridgePath {
    names: Vec<String>,
}

impl CartridgePath {
    /// Parse a colon-separated cartridge path as found in `dw.json` or the
    /// host settings.
    ///
    /// Empty segments, duplicates (first occurrence wins), and ignored
    /// pseudo-cartridges are dropped.
    pub fn parse(raw: &str) -> Self {
        let mut names: Vec<String> = Vec::new();
        for segment in raw.split(':') {
            let segment = segment.trim();
            if segment.is_empty() || IGNORED_CARTRIDGES.contains(&segment) {
                continue;
            }
            if names.iter().any(|existing| existing == segment) {
                continue;
            }
            names.push(segment.to_string());
        }
        Self { names }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let joined: Vec<String> = names.into_iter().map(Into::into).collect();
        Self::parse(&joined.join(":"))
    }

    /// Position of `name` in priority order, or `None` when the cartridge is
    /// not declared. Files from undeclared cartridges must be excluded from
    /// indexing.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl fmt::Display for CartridgePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names.join(":"))
    }
}
