/// A file path decomposed per the fixed cartridge directory convention:
/// `<base>/cartridges/<name>/cartridge/<relative>`.
///
/// All components are reported with `/` separators regardless of what the
/// input used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartridgeFilePath {
    pub base_path: String,
    pub cartridge: String,
    pub relative_path: String,
}

/// Split a path on either separator so matching behaves identically on
/// Windows and Unix hosts.
pub fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', '\\'])
}

/// Match `path` against the cartridge directory convention.
///
/// Returns `None` for anything that does not conform; callers treat that as
/// "not a cartridge file" and skip silently. Like the convention, the match
/// is anchored on the *last* `cartridges/<name>/cartridge` sequence so nested
/// checkouts resolve to the innermost cartridge. The base and relative parts
/// must both be non-empty and the cartridge name is a single segment.
pub fn match_cartridge_file(path: &str) -> Option<CartridgeFilePath> {
    let segments: Vec<&str> = split_segments(path).collect();

    let mut found = None;
    for i in 1..segments.len() {
        if segments[i] == "cartridges"
            && i + 3 < segments.len()
            && !segments[i + 1].is_empty()
            && segments[i + 2] == "cartridge"
            && segments[..i].iter().any(|s| !s.is_empty())
        {
            found = Some(i);
        }
    }

    let i = found?;
    Some(CartridgeFilePath {
        base_path: segments[..i].join("/"),
        cartridge: segments[i + 1].to_string(),
        relative_path: segments[i + 3..].join("/"),
    })
}
