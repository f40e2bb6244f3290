#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Fire-and-forget sink for user-facing messages.
pub trait Notifier: Send + Sync {
    fn show_message(&self, text: &str, severity: Severity);
}
