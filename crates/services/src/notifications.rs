use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Generic text shown for transport failures.
pub const SERVER_ERROR_MESSAGE: &str = "Server error, please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    Error,
    Warning,
    #[default]
    Info,
    Success,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Success => "success",
        }
    }
}

/// What the snackbar currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snackbar {
    pub open: bool,
    pub message: String,
    pub severity: Severity,
}

/// App-wide snackbar state. Clones share the same snackbar.
#[derive(Clone, Default)]
pub struct Notifier {
    state: Arc<Mutex<Snackbar>>,
}

impl Notifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Snackbar> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn show(&self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        tracing::debug!(severity = severity.as_str(), %message, "snackbar shown");
        *self.lock() = Snackbar {
            open: true,
            message,
            severity,
        };
    }

    pub fn server_error(&self) {
        self.show(SERVER_ERROR_MESSAGE, Severity::Error);
    }

    /// Close the snackbar, keeping the last message for fade-out.
    pub fn hide(&self) {
        self.lock().open = false;
    }

    #[must_use]
    pub fn current(&self) -> Snackbar {
        self.lock().clone()
    }

    pub fn reset(&self) {
        *self.lock() = Snackbar::default();
    }
}
