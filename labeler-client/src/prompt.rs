//! User-facing notifications and confirmations

use tracing::{info, warn};

/// How the app reaches the person at the keyboard
pub trait Prompt: Send + Sync {
    /// Blocking notification, e.g. a failed save
    fn notify(&self, message: &str);

    /// Yes/no question asked before destructive actions
    fn confirm(&self, question: &str) -> bool;
}

/// Non-interactive prompt: logs notices and answers every question the same way
#[derive(Debug, Clone, Copy)]
pub struct LogPrompt {
    pub assume_yes: bool,
}

impl Prompt for LogPrompt {
    fn notify(&self, message: &str) {
        warn!("{}", message);
    }

    fn confirm(&self, question: &str) -> bool {
        info!("{} -> {}", question, if self.assume_yes { "yes" } else { "no" });
        self.assume_yes
    }
}
