//! `dw.json` adoption.
//!
//! Projects usually declare their cartridge path in `dw.json` for the
//! platform's own tooling. The engine never edits that file; it only offers
//! to copy the path into its own settings, so developers are not forced to
//! keep the two in sync by hand.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::notifier::Notifier;

#[derive(Debug, Deserialize)]
struct DwConfig {
    #[serde(rename = "cartridgesPath")]
    cartridges_path: Option<String>,
}

/// Offer to adopt the cartridge path declared in `<root>/dw.json`.
///
/// Returns the declared path when it is present, non-empty, differs from
/// `current`, and the host confirms. A missing file or malformed JSON is not
/// an error; both leave the current setting in place.
pub fn adopt_dw_config(root: &Path, current: &str, notifier: &dyn Notifier) -> Option<String> {
    let path = root.join("dw.json");
    let text = fs::read_to_string(&path).ok()?;

    let config: DwConfig = match serde_json::from_str(&text) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                target = "sfcc.workspace",
                error = %err,
                "dw.json is not valid JSON, keeping the configured cartridge path"
            );
            return None;
        }
    };

    let declared = config.cartridges_path.filter(|p| !p.is_empty())?;
    if declared == current {
        return None;
    }

    let message = if current.is_empty() {
        format!("dw.json declares a cartridge path. Use `{declared}`?")
    } else {
        format!("dw.json declares a different cartridge path. Switch to `{declared}`?")
    };
    notifier.confirm(&message).then_some(declared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Answering {
        answer: bool,
        asked: RefCell<Vec<String>>,
    }

    impl Answering {
        fn new(answer: bool) -> Self {
            Self {
                answer,
                asked: RefCell::new(Vec::new()),
            }
        }
    }

    impl Notifier for Answering {
        fn info(&self, _message: &str) {}
        fn warn(&self, _message: &str) {}
        fn confirm(&self, message: &str) -> bool {
            self.asked.borrow_mut().push(message.to_string());
            self.answer
        }
    }

    fn write_dw(dir: &Path, contents: &str) {
        fs::write(dir.join("dw.json"), contents).unwrap();
    }

    #[test]
    fn adopts_a_differing_path_on_confirmation() {
        let tmp = tempfile::tempdir().unwrap();
        write_dw(
            tmp.path(),
            r#"{"hostname": "dev.example.com", "cartridgesPath": "app_custom:app_storefront_base"}"#,
        );

        let notifier = Answering::new(true);
        let adopted = adopt_dw_config(tmp.path(), "app_storefront_base", &notifier);
        assert_eq!(adopted.as_deref(), Some("app_custom:app_storefront_base"));
        assert_eq!(notifier.asked.borrow().len(), 1);
    }

    #[test]
    fn declining_keeps_the_current_path() {
        let tmp = tempfile::tempdir().unwrap();
        write_dw(tmp.path(), r#"{"cartridgesPath": "app_custom"}"#);

        assert_eq!(adopt_dw_config(tmp.path(), "", &Answering::new(false)), None);
    }

    #[test]
    fn matching_or_empty_paths_do_not_prompt() {
        let tmp = tempfile::tempdir().unwrap();

        write_dw(tmp.path(), r#"{"cartridgesPath": "app_custom"}"#);
        let notifier = Answering::new(true);
        assert_eq!(adopt_dw_config(tmp.path(), "app_custom", &notifier), None);

        write_dw(tmp.path(), r#"{"cartridgesPath": ""}"#);
        assert_eq!(adopt_dw_config(tmp.path(), "app_custom", &notifier), None);

        write_dw(tmp.path(), r#"{"hostname": "dev.example.com"}"#);
        assert_eq!(adopt_dw_config(tmp.path(), "app_custom", &notifier), None);

        assert!(notifier.asked.borrow().is_empty());
    }

    #[test]
    fn malformed_json_is_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_dw(tmp.path(), "{not json");

        let notifier = Answering::new(true);
        assert_eq!(adopt_dw_config(tmp.path(), "", &notifier), None);
        assert!(notifier.asked.borrow().is_empty());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(adopt_dw_config(tmp.path(), "", &Answering::new(true)), None);
    }
}
