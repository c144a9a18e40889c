/// Host-facing notifications.
///
/// The engine reports "cartridge missing", "no overrides found", and asks the
/// `dw.json` adoption question through this seam; how those surface (dialogs,
/// status bar, stderr) is the host's business.
pub trait Notifier {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    /// Ask a yes/no question. Hosts that cannot ask should return `false`.
    fn confirm(&self, message: &str) -> bool;
}

/// Routes messages to the log and declines every confirmation.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn info(&self, message: &str) {
        tracing::info!(target = "sfcc.workspace", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target = "sfcc.workspace", "{message}");
    }

    fn confirm(&self, _message: &str) -> bool {
        false
    }
}
