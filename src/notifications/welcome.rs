//! The notification set shown to freshly registered users.

use chrono::{DateTime, Duration, Utc};

use super::models::{NewNotification, Notification};

/// Builds the welcome set, newest first. The tip is backdated by one minute so
/// it sorts after the greeting.
pub fn welcome_notifications<F>(now: DateTime<Utc>, mut next_id: F) -> Vec<Notification>
where
    F: FnMut() -> String,
{
    let welcome = NewNotification::new("welcome")
        .with_title(
            "مرحباً بك في منصة مصر العقارية",
            "Welcome to Egyptian Real Estate Platform",
        )
        .with_message(
            "تم تسجيل حسابك بنجاح. ابدأ البحث عن عقارك المثالي!",
            "Your account has been created. Start searching for your perfect property!",
        );

    let tip = NewNotification::new("tip")
        .with_title(
            "نصيحة: احفظ عقاراتك المفضلة",
            "Tip: Save your favorite properties",
        )
        .with_message(
            "اضغط على أيقونة القلب لحفظ العقارات في المفضلة",
            "Click the heart icon to save properties to favorites",
        );

    vec![
        welcome.into_notification(next_id(), now),
        tip.into_notification(next_id(), now - Duration::minutes(1)),
    ]
}
