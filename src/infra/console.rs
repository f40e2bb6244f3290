use tracing::{error, info, warn};

use crate::services::{Notifier, Severity};

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn show_message(&self, text: &str, severity: Severity) {
        match severity {
            Severity::Info => info!(target: "notify", "{text}"),
            Severity::Warning => warn!(target: "notify", "{text}"),
            Severity::Error => error!(target: "notify", "{text}"),
        }
    }
}
