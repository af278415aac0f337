use crate::notifications::Notification;
use crate::user::auth::PasswordDigest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub email_notifications: bool,
    pub price_alerts: bool,
    pub new_listings: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        UserSettings {
            email_notifications: true,
            price_alerts: true,
            new_listings: true,
        }
    }
}

/// A persisted user record, including the password digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password_digest: PasswordDigest,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub favorites: Vec<String>,
    #[serde(default)]
    pub recently_viewed: Vec<String>,
    #[serde(default)]
    pub saved_searches: Vec<serde_json::Value>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub settings: UserSettings,
}

/// A user as handed to callers: every field of [`User`] except the digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub avatar: Option<String>,
    pub favorites: Vec<String>,
    pub recently_viewed: Vec<String>,
    pub saved_searches: Vec<serde_json::Value>,
    pub notifications: Vec<Notification>,
    pub settings: UserSettings,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        UserView {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            created_at: user.created_at,
            avatar: user.avatar.clone(),
            favorites: user.favorites.clone(),
            recently_viewed: user.recently_viewed.clone(),
            saved_searches: user.saved_searches.clone(),
            notifications: user.notifications.clone(),
            settings: user.settings,
        }
    }
}

impl UserView {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The active session. At most one exists at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

impl Registration {
    pub fn new<F, L, E, P>(first_name: F, last_name: L, email: E, password: P) -> Self
    where
        F: Into<String>,
        L: Into<String>,
        E: Into<String>,
        P: Into<String>,
    {
        Registration {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: None,
            password: password.into(),
        }
    }

    pub fn with_phone<T: Into<String>>(mut self, phone: T) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Distinguishes an absent field from an explicit `null`.
fn explicit_value<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial profile edit. Only the whitelisted fields exist here, so anything
/// else a caller sends (email, password, favorites...) is dropped on parse.
///
/// `phone` and `avatar` are doubly optional: `None` leaves the field alone,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(deserialize_with = "explicit_value")]
    pub phone: Option<Option<String>>,
    #[serde(deserialize_with = "explicit_value")]
    pub avatar: Option<Option<String>>,
    pub settings: Option<UserSettings>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.avatar.is_none()
            && self.settings.is_none()
    }
}

impl User {
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(first_name) = update.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name;
        }
        if let Some(phone) = update.phone {
            self.phone = phone.filter(|phone| !phone.is_empty());
        }
        if let Some(avatar) = update.avatar {
            self.avatar = avatar;
        }
        if let Some(settings) = update.settings {
            self.settings = settings;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::auth::CredentialHasher;

    fn sample_user() -> User {
        User {
            id: "user_1".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Diaz".to_string(),
            email: "ana@x.io".to_string(),
            phone: None,
            password_digest: PasswordDigest {
                hasher: CredentialHasher::Argon2,
                hash: "$argon2id$fake".to_string(),
            },
            created_at: Utc::now(),
            avatar: None,
            favorites: vec!["p1".to_string()],
            recently_viewed: vec![],
            saved_searches: vec![],
            notifications: vec![],
            settings: UserSettings::default(),
        }
    }

    #[test]
    fn default_settings_are_all_enabled() {
        let settings = UserSettings::default();
        assert!(settings.email_notifications);
        assert!(settings.price_alerts);
        assert!(settings.new_listings);
    }

    #[test]
    fn partial_settings_fill_missing_toggles() {
        let settings: UserSettings = serde_json::from_str(r#"{"priceAlerts":false}"#).unwrap();
        assert!(!settings.price_alerts);
        assert!(settings.email_notifications);
    }

    #[test]
    fn view_drops_password_digest() {
        let user = sample_user();
        let view = UserView::from(&user);
        let value = serde_json::to_value(&view).unwrap();

        assert!(value.get("passwordDigest").is_none());
        assert!(value.get("password").is_none());
        assert_eq!(value["firstName"], "Ana");
        assert_eq!(view.full_name(), "Ana Diaz");
    }

    #[test]
    fn record_serializes_digest_not_password() {
        let value = serde_json::to_value(sample_user()).unwrap();
        assert_eq!(value["passwordDigest"]["hasher"], "argon2");
        assert!(value.get("password").is_none());
        assert_eq!(value["recentlyViewed"], serde_json::json!([]));
    }

    #[test]
    fn profile_update_ignores_unknown_fields() {
        let update: ProfileUpdate = serde_json::from_str(
            r#"{"firstName":"Ann","email":"evil@x.io","password":"x","favorites":["p9"]}"#,
        )
        .unwrap();

        let mut user = sample_user();
        user.apply(update);

        assert_eq!(user.first_name, "Ann");
        assert_eq!(user.email, "ana@x.io");
        assert_eq!(user.favorites, vec!["p1".to_string()]);
    }

    #[test]
    fn profile_update_distinguishes_null_from_missing() {
        let mut user = sample_user();
        user.phone = Some("0100".to_string());
        user.avatar = Some("a.png".to_string());

        let clear_phone: ProfileUpdate = serde_json::from_str(r#"{"phone":null}"#).unwrap();
        assert_eq!(clear_phone.phone, Some(None));
        assert_eq!(clear_phone.avatar, None);

        user.apply(clear_phone);
        assert_eq!(user.phone, None);
        assert_eq!(user.avatar, Some("a.png".to_string()));
    }

    #[test]
    fn empty_phone_update_clears_phone() {
        let mut user = sample_user();
        user.phone = Some("0100".to_string());

        let update: ProfileUpdate = serde_json::from_str(r#"{"phone":""}"#).unwrap();
        user.apply(update);
        assert_eq!(user.phone, None);
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(ProfileUpdate::default().is_empty());
        let update = ProfileUpdate {
            last_name: Some("Lee".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
