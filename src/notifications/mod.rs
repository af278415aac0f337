//! User notifications module

mod models;
mod welcome;

pub use models::{Locale, NewNotification, Notification, DEFAULT_NOTIFICATION_LINK};
pub use welcome::welcome_notifications;
