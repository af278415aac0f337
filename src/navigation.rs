//! Screen navigation requested by account operations.

use tracing::info;

/// Screen shown after logout.
pub const HOME_SCREEN: &str = "index.html";

pub trait Navigator: Send + Sync {
    fn navigate_to(&self, target: &str);
}

/// Default navigator for headless use: records the request in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate_to(&self, target: &str) {
        info!("Navigating to {}", target);
    }
}
