use crate::panel::{NavigationTarget, PanelEntry};

/// A resolved two-file comparison, ready for the host's diff view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffRequest {
    pub before: NavigationTarget,
    pub after: NavigationTarget,
    /// `"<before cartridge> ↔ <after cartridge>"`.
    pub title: String,
}

/// Order two selected stack entries for diffing.
///
/// `before` is the entry deeper in the stack (higher `sort_order`), so the
/// diff always reads base-to-override regardless of click order. Anything but
/// exactly two openable entries yields `None`.
pub fn diff_request(selection: &[PanelEntry]) -> Option<DiffRequest> {
    let [first, second] = selection else {
        return None;
    };

    let (before, after) = if first.sort_order < second.sort_order {
        (second, first)
    } else {
        (first, second)
    };

    Some(DiffRequest {
        before: before.target.clone()?,
        after: after.target.clone()?,
        title: format!("{} ↔ {}", before.description, after.description),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::EntryIcon;
    use pretty_assertions::assert_eq;
    use sfcc_core::FileKind;

    fn entry(cartridge: &str, sort_order: usize, path: &str) -> PanelEntry {
        PanelEntry {
            name: "product.js".to_string(),
            description: cartridge.to_string(),
            is_selected: false,
            sort_order,
            icon: EntryIcon::Source(FileKind::Model),
            target: Some(NavigationTarget {
                path: path.to_string(),
                line: None,
            }),
            children: Vec::new(),
        }
    }

    #[test]
    fn orders_base_before_override() {
        let custom = entry("app_custom", 0, "a/product.js");
        let base = entry("app_storefront_base", 1, "b/product.js");

        let expected = DiffRequest {
            before: NavigationTarget {
                path: "b/product.js".to_string(),
                line: None,
            },
            after: NavigationTarget {
                path: "a/product.js".to_string(),
                line: None,
            },
            title: "app_storefront_base ↔ app_custom".to_string(),
        };

        // Click order does not matter.
        assert_eq!(
            diff_request(&[custom.clone(), base.clone()]),
            Some(expected.clone())
        );
        assert_eq!(diff_request(&[base, custom]), Some(expected));
    }

    #[test]
    fn rejects_anything_but_two_openable_entries() {
        let a = entry("a", 0, "a/product.js");
        let b = entry("b", 1, "b/product.js");
        let c = entry("c", 2, "c/product.js");

        assert_eq!(diff_request(&[]), None);
        assert_eq!(diff_request(&[a.clone()]), None);
        assert_eq!(diff_request(&[a.clone(), b.clone(), c]), None);

        let mut unopenable = b;
        unopenable.target = None;
        assert_eq!(diff_request(&[a, unopenable]), None);
    }
}
