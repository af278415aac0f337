use crate::navigation::{LoggingNavigator, Navigator, HOME_SCREEN};
use crate::notifications::{welcome_notifications, NewNotification, Notification};
use crate::storage::KeyValueStore;

use super::{
    auth::CredentialHasher,
    errors::{UserStoreError, ValidationIssue},
    user_models::{ProfileUpdate, Registration, Session, User, UserSettings, UserView},
    validation::{self, EmailPolicy},
};
use anyhow::Context;
use chrono::Utc;
use rand::Rng;
use rand_distr::Alphanumeric;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

pub const DEFAULT_USERS_KEY: &str = "egyptian_realestate_user_users";
pub const DEFAULT_SESSION_KEY: &str = "egyptian_realestate_session";
pub const MAX_NOTIFICATIONS: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 6;

const ID_SUFFIX_LENGTH: usize = 12;

pub type StoreResult<T> = std::result::Result<T, UserStoreError>;

#[derive(Debug, Clone, PartialEq)]
pub struct UserStoreSettings {
    pub users_key: String,
    pub session_key: String,
    pub max_notifications: usize,
    pub min_password_length: usize,
    pub email_policy: EmailPolicy,
    pub hasher: CredentialHasher,
    pub welcome_notifications: bool,
}

impl Default for UserStoreSettings {
    fn default() -> Self {
        UserStoreSettings {
            users_key: DEFAULT_USERS_KEY.to_string(),
            session_key: DEFAULT_SESSION_KEY.to_string(),
            max_notifications: MAX_NOTIFICATIONS,
            min_password_length: MIN_PASSWORD_LENGTH,
            email_policy: EmailPolicy::default(),
            hasher: CredentialHasher::default(),
            welcome_notifications: false,
        }
    }
}

fn random_id(prefix: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_SUFFIX_LENGTH)
        .map(char::from)
        .collect();
    format!("{}_{}{}", prefix, Utc::now().timestamp_millis(), suffix)
}

fn new_user_id() -> String {
    random_id("user")
}

fn new_notification_id() -> String {
    random_id("notif")
}

/// Accounts, the active session, favorites and notifications.
///
/// All state lives in the injected substrate under two keys and is re-read on
/// every call, so nothing is cached between operations. Each operation holds
/// the substrate lock from its first read to its last write.
pub struct UserStore {
    storage: Mutex<Box<dyn KeyValueStore>>,
    navigator: Box<dyn Navigator>,
    settings: UserStoreSettings,
}

impl UserStore {
    pub fn new(storage: Box<dyn KeyValueStore>, settings: UserStoreSettings) -> Self {
        UserStore {
            storage: Mutex::new(storage),
            navigator: Box::new(LoggingNavigator),
            settings,
        }
    }

    pub fn with_navigator(mut self, navigator: Box<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn settings(&self) -> &UserStoreSettings {
        &self.settings
    }

    fn storage(&self) -> MutexGuard<'_, Box<dyn KeyValueStore>> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_users(&self, storage: &dyn KeyValueStore) -> anyhow::Result<Vec<User>> {
        let Some(raw) = storage.get(&self.settings.users_key)? else {
            return Ok(vec![]);
        };
        match serde_json::from_str(&raw) {
            Ok(users) => Ok(users),
            Err(err) => {
                warn!(
                    "Users collection under {} is malformed, treating it as empty: {}",
                    self.settings.users_key, err
                );
                Ok(vec![])
            }
        }
    }

    fn save_users(&self, storage: &dyn KeyValueStore, users: &[User]) -> anyhow::Result<()> {
        let json = serde_json::to_string(users).context("Failed to serialize users")?;
        storage.set(&self.settings.users_key, &json)
    }

    fn load_session(&self, storage: &dyn KeyValueStore) -> anyhow::Result<Option<Session>> {
        let Some(raw) = storage.get(&self.settings.session_key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                warn!("Session record is malformed, ignoring it: {}", err);
                Ok(None)
            }
        }
    }

    fn start_session(&self, storage: &dyn KeyValueStore, user_id: &str) -> anyhow::Result<()> {
        let session = Session {
            user_id: user_id.to_owned(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&session).context("Failed to serialize session")?;
        storage.set(&self.settings.session_key, &json)
    }

    /// Position of the session's user in `users`, if the session resolves.
    fn current_user_index(
        &self,
        storage: &dyn KeyValueStore,
        users: &[User],
    ) -> anyhow::Result<Option<usize>> {
        let Some(session) = self.load_session(storage)? else {
            return Ok(None);
        };
        let index = users.iter().position(|user| user.id == session.user_id);
        if index.is_none() {
            debug!("Session points to unknown user {}", session.user_id);
        }
        Ok(index)
    }

    /// Runs `read` against the current user. Read failures of the substrate are
    /// logged and reported as "nobody logged in".
    fn read_current_user<T, F>(&self, read: F) -> Option<T>
    where
        F: FnOnce(&User) -> T,
    {
        let storage = self.storage();
        let lookup = self.load_users(&**storage).and_then(|users| {
            Ok(self
                .current_user_index(&**storage, &users)?
                .map(|index| read(&users[index])))
        });
        match lookup {
            Ok(value) => value,
            Err(err) => {
                warn!("Failed to read current user: {:#}", err);
                None
            }
        }
    }

    /// Loads, mutates and, when `mutate` reports a change, saves the current
    /// user under a single lock.
    fn update_current_user<T, F>(&self, mutate: F) -> StoreResult<T>
    where
        F: FnOnce(&mut User) -> StoreResult<(T, bool)>,
    {
        let storage = self.storage();
        let mut users = self.load_users(&**storage)?;
        let index = self
            .current_user_index(&**storage, &users)?
            .ok_or(UserStoreError::Unauthenticated)?;

        let (value, changed) = mutate(&mut users[index])?;
        if changed {
            self.save_users(&**storage, &users)?;
        }
        Ok(value)
    }

    fn find_by_email<'a>(&self, users: &'a [User], email: &str) -> Option<&'a User> {
        users
            .iter()
            .find(|user| self.settings.email_policy.matches(&user.email, email))
    }

    pub fn register(&self, registration: Registration) -> StoreResult<UserView> {
        validation::validate_registration(&registration, self.settings.min_password_length)?;

        let storage = self.storage();
        let mut users = self.load_users(&**storage)?;
        if self.find_by_email(&users, &registration.email).is_some() {
            return Err(UserStoreError::DuplicateEmail(registration.email));
        }

        let password_digest = self.settings.hasher.digest(&registration.password)?;
        let created_at = Utc::now();
        let mut user = User {
            id: new_user_id(),
            first_name: registration.first_name,
            last_name: registration.last_name,
            email: registration.email,
            phone: registration.phone.filter(|phone| !phone.is_empty()),
            password_digest,
            created_at,
            avatar: None,
            favorites: vec![],
            recently_viewed: vec![],
            saved_searches: vec![],
            notifications: vec![],
            settings: UserSettings::default(),
        };
        if self.settings.welcome_notifications {
            user.notifications = welcome_notifications(created_at, new_notification_id);
        }

        let view = UserView::from(&user);
        users.push(user);
        self.save_users(&**storage, &users)?;
        self.start_session(&**storage, &view.id)?;

        info!("Registered user {}", view.id);
        Ok(view)
    }

    pub fn login(&self, email: &str, password: &str) -> StoreResult<UserView> {
        validation::validate_credentials(email, password)?;

        let storage = self.storage();
        let users = self.load_users(&**storage)?;
        let user = self
            .find_by_email(&users, email)
            .ok_or_else(|| UserStoreError::EmailNotRegistered(email.to_owned()))?;

        if !user.password_digest.verify(password)? {
            info!("Rejected login for user {}", user.id);
            return Err(UserStoreError::InvalidCredentials);
        }

        self.start_session(&**storage, &user.id)?;
        info!("User {} logged in", user.id);
        Ok(UserView::from(user))
    }

    /// Ends the session, if any, and sends the navigator home.
    pub fn logout(&self) -> StoreResult<()> {
        {
            let storage = self.storage();
            storage.remove(&self.settings.session_key)?;
        }
        info!("Session cleared");
        self.navigator.navigate_to(HOME_SCREEN);
        Ok(())
    }

    /// True when a session record exists, even if its user is gone.
    pub fn is_logged_in(&self) -> bool {
        match self.storage().get(&self.settings.session_key) {
            Ok(session) => session.is_some(),
            Err(err) => {
                warn!("Failed to read session: {:#}", err);
                false
            }
        }
    }

    pub fn current_user(&self) -> Option<UserView> {
        self.read_current_user(|user| UserView::from(user))
    }

    pub fn update_profile(&self, update: ProfileUpdate) -> StoreResult<UserView> {
        let view = self.update_current_user(|user| {
            let blank_name = [&update.first_name, &update.last_name]
                .into_iter()
                .any(|name| name.as_deref() == Some(""));
            if blank_name {
                return Err(ValidationIssue::EmptyName.into());
            }
            user.apply(update);
            Ok((UserView::from(&*user), true))
        })?;
        info!("Updated profile of user {}", view.id);
        Ok(view)
    }

    /// Returns the favorites after the change. Adding an id that is already
    /// present leaves the collection untouched.
    pub fn add_to_favorites(&self, property_id: &str) -> StoreResult<Vec<String>> {
        self.update_current_user(|user| {
            let changed = !user.favorites.iter().any(|id| id == property_id);
            if changed {
                user.favorites.push(property_id.to_owned());
            }
            Ok((user.favorites.clone(), changed))
        })
    }

    pub fn remove_from_favorites(&self, property_id: &str) -> StoreResult<Vec<String>> {
        self.update_current_user(|user| {
            let before = user.favorites.len();
            user.favorites.retain(|id| id != property_id);
            let changed = user.favorites.len() != before;
            Ok((user.favorites.clone(), changed))
        })
    }

    pub fn favorites(&self) -> Vec<String> {
        self.read_current_user(|user| user.favorites.clone())
            .unwrap_or_default()
    }

    pub fn is_favorite(&self, property_id: &str) -> bool {
        self.read_current_user(|user| user.favorites.iter().any(|id| id == property_id))
            .unwrap_or(false)
    }

    /// Prepends a notification for the current user, dropping the oldest ones
    /// beyond the configured cap. Fails with `Unauthenticated` when nobody is
    /// logged in instead of dropping the notification silently.
    pub fn add_notification(&self, notification: NewNotification) -> StoreResult<Notification> {
        // The notification just created is always kept
        let max_notifications = self.settings.max_notifications.max(1);
        self.update_current_user(|user| {
            let created = notification.into_notification(new_notification_id(), Utc::now());
            user.notifications.insert(0, created.clone());
            user.notifications.truncate(max_notifications);
            debug!(
                "Added notification {} for user {}, now {}",
                created.id,
                user.id,
                user.notifications.len()
            );
            Ok((created, true))
        })
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.read_current_user(|user| user.notifications.clone())
            .unwrap_or_default()
    }

    /// Returns whether the notification exists for the current user. Without a
    /// session this is `Ok(false)`, mirroring an unknown id.
    pub fn mark_notification_read(&self, notification_id: &str) -> StoreResult<bool> {
        let result = self.update_current_user(|user| {
            match user
                .notifications
                .iter_mut()
                .find(|notification| notification.id == notification_id)
            {
                Some(notification) => {
                    let changed = !notification.read;
                    notification.read = true;
                    Ok((true, changed))
                }
                None => Ok((false, false)),
            }
        });
        match result {
            Err(UserStoreError::Unauthenticated) => Ok(false),
            other => other,
        }
    }

    pub fn unread_notification_count(&self) -> usize {
        self.read_current_user(|user| user.notifications.iter().filter(|n| !n.read).count())
            .unwrap_or(0)
    }

    /// Replaces the notifications of `user_id` with the welcome set.
    pub fn create_welcome_notifications(&self, user_id: &str) -> StoreResult<Vec<Notification>> {
        let storage = self.storage();
        let mut users = self.load_users(&**storage)?;
        let user = users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or_else(|| UserStoreError::UserNotFound(user_id.to_owned()))?;

        user.notifications = welcome_notifications(Utc::now(), new_notification_id);
        let notifications = user.notifications.clone();
        self.save_users(&**storage, &users)?;
        Ok(notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;
    use crate::user::errors::ErrorKind;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct RecordingNavigator {
        targets: Arc<Mutex<Vec<String>>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate_to(&self, target: &str) {
            self.targets.lock().unwrap().push(target.to_owned());
        }
    }

    fn create_store() -> (UserStore, MemoryKeyValueStore) {
        let backing = MemoryKeyValueStore::new();
        let store = UserStore::new(Box::new(backing.clone()), UserStoreSettings::default());
        (store, backing)
    }

    fn ana() -> Registration {
        Registration::new("Ana", "Diaz", "ana@x.io", "secret1")
    }

    #[test]
    fn register_starts_session_and_sanitizes() {
        let (store, backing) = create_store();

        let user = store.register(ana()).unwrap();
        assert!(user.id.starts_with("user_"));
        assert!(user.favorites.is_empty());
        assert!(user.notifications.is_empty());
        assert_eq!(user.settings, UserSettings::default());
        assert!(store.is_logged_in());
        assert_eq!(store.current_user(), Some(user.clone()));

        let session: Session =
            serde_json::from_str(&backing.get(DEFAULT_SESSION_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(session.user_id, user.id);

        let raw_users = backing.get(DEFAULT_USERS_KEY).unwrap().unwrap();
        assert!(!raw_users.contains("secret1"));
    }

    #[test]
    fn register_rejects_duplicate_email() {
        let (store, _) = create_store();
        store.register(ana()).unwrap();

        let err = store
            .register(Registration::new("Ann", "Other", "ana@x.io", "another1"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateEmail);
    }

    #[test]
    fn invalid_registration_does_not_touch_storage() {
        let (store, backing) = create_store();
        let err = store
            .register(Registration::new("Ana", "Diaz", "nope", "secret1"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(backing.keys().unwrap().is_empty());
    }

    #[test]
    fn empty_phone_is_stored_as_absent() {
        let (store, _) = create_store();
        let user = store.register(ana().with_phone("")).unwrap();
        assert_eq!(user.phone, None);
    }

    #[test]
    fn login_reports_unknown_email_and_wrong_password() {
        let (store, _) = create_store();
        store.register(ana()).unwrap();
        store.logout().unwrap();

        let unknown = store.login("bob@x.io", "secret1").unwrap_err();
        assert!(matches!(unknown, UserStoreError::EmailNotRegistered(_)));

        let wrong = store.login("ana@x.io", "secret2").unwrap_err();
        assert_eq!(wrong.kind(), ErrorKind::InvalidCredentials);
        assert!(!store.is_logged_in());

        let missing = store.login("", "secret1").unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::Validation);
    }

    #[test]
    fn email_policy_controls_login_lookup() {
        let (store, _) = create_store();
        store.register(ana()).unwrap();
        assert!(store.login("Ana@X.io", "secret1").is_err());

        let settings = UserStoreSettings {
            email_policy: EmailPolicy::CaseInsensitive,
            ..Default::default()
        };
        let backing = MemoryKeyValueStore::new();
        let insensitive = UserStore::new(Box::new(backing), settings);
        insensitive.register(ana()).unwrap();
        assert!(insensitive.login("Ana@X.io", "secret1").is_ok());
        assert!(insensitive
            .register(Registration::new("A", "B", "ANA@x.io", "secret1"))
            .is_err());
    }

    #[test]
    fn logout_navigates_home_even_without_session() {
        let navigator = RecordingNavigator::default();
        let store = UserStore::new(
            Box::new(MemoryKeyValueStore::new()),
            UserStoreSettings::default(),
        )
        .with_navigator(Box::new(navigator.clone()));

        store.logout().unwrap();
        assert_eq!(*navigator.targets.lock().unwrap(), vec![HOME_SCREEN.to_string()]);
    }

    #[test]
    fn dangling_session_is_logged_in_but_has_no_user() {
        let (store, backing) = create_store();
        backing
            .set(
                DEFAULT_SESSION_KEY,
                r#"{"userId":"user_gone","createdAt":"2024-05-01T10:00:00Z"}"#,
            )
            .unwrap();

        assert!(store.is_logged_in());
        assert!(store.current_user().is_none());
        assert!(store.favorites().is_empty());
        assert_eq!(
            store.add_to_favorites("p1").unwrap_err().kind(),
            ErrorKind::Unauthenticated
        );
    }

    #[test]
    fn malformed_records_read_as_absent() {
        let (store, backing) = create_store();
        backing.set(DEFAULT_USERS_KEY, "not json").unwrap();
        backing.set(DEFAULT_SESSION_KEY, "{").unwrap();

        assert!(store.current_user().is_none());
        assert_eq!(store.unread_notification_count(), 0);

        store.register(ana()).unwrap();
        assert_eq!(store.current_user().unwrap().email, "ana@x.io");
    }

    #[test]
    fn update_profile_applies_whitelisted_fields() {
        let (store, _) = create_store();
        store.register(ana().with_phone("0100")).unwrap();

        let update: ProfileUpdate =
            serde_json::from_str(r#"{"lastName":"Lee","email":"x@y.io","phone":null}"#).unwrap();
        let user = store.update_profile(update).unwrap();

        assert_eq!(user.last_name, "Lee");
        assert_eq!(user.email, "ana@x.io");
        assert_eq!(user.phone, None);
        assert_eq!(store.current_user().unwrap(), user);
    }

    #[test]
    fn update_profile_rejects_blank_names_and_missing_session() {
        let (store, _) = create_store();
        let err = store.update_profile(ProfileUpdate::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);

        store.register(ana()).unwrap();
        let blank = ProfileUpdate {
            first_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            store.update_profile(blank).unwrap_err().kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn update_profile_checks_session_before_names() {
        let (store, backing) = create_store();
        let blank = ProfileUpdate {
            first_name: Some(String::new()),
            ..Default::default()
        };

        let err = store.update_profile(blank).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
        assert!(backing.get(DEFAULT_USERS_KEY).unwrap().is_none());
    }

    #[test]
    fn favorites_have_set_semantics() {
        let (store, _) = create_store();
        store.register(ana()).unwrap();

        assert_eq!(store.add_to_favorites("p1").unwrap(), vec!["p1"]);
        assert_eq!(store.add_to_favorites("p1").unwrap(), vec!["p1"]);
        assert_eq!(store.add_to_favorites("p2").unwrap(), vec!["p1", "p2"]);
        assert!(store.is_favorite("p2"));

        assert_eq!(store.remove_from_favorites("p9").unwrap(), vec!["p1", "p2"]);
        assert_eq!(store.remove_from_favorites("p1").unwrap(), vec!["p2"]);
        assert_eq!(store.favorites(), vec!["p2"]);
        assert!(!store.is_favorite("p1"));
    }

    #[test]
    fn favorites_require_session() {
        let (store, _) = create_store();
        assert_eq!(
            store.remove_from_favorites("p1").unwrap_err().kind(),
            ErrorKind::Unauthenticated
        );
        assert!(!store.is_favorite("p1"));
    }

    #[test]
    fn notifications_are_newest_first_and_capped() {
        let settings = UserStoreSettings {
            max_notifications: 3,
            ..Default::default()
        };
        let store = UserStore::new(Box::new(MemoryKeyValueStore::new()), settings);
        store.register(ana()).unwrap();

        for i in 0..5 {
            store
                .add_notification(NewNotification::new("info").with_title("", format!("n{}", i)))
                .unwrap();
        }

        let titles: Vec<String> = store
            .notifications()
            .into_iter()
            .map(|n| n.title_en)
            .collect();
        assert_eq!(titles, vec!["n4", "n3", "n2"]);
        assert_eq!(store.unread_notification_count(), 3);
    }

    #[test]
    fn zero_notification_cap_keeps_newest() {
        let backing = MemoryKeyValueStore::new();
        let store = UserStore::new(
            Box::new(backing),
            UserStoreSettings {
                max_notifications: 0,
                ..Default::default()
            },
        );
        store.register(ana()).unwrap();

        store.add_notification(NewNotification::new("info")).unwrap();
        let newest = store.add_notification(NewNotification::new("info")).unwrap();
        assert_eq!(store.notifications(), vec![newest]);
    }

    #[test]
    fn add_notification_requires_session() {
        let (store, _) = create_store();
        let err = store
            .add_notification(NewNotification::new("info"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    }

    #[test]
    fn mark_read_is_noop_for_unknown_id_or_no_session() {
        let (store, _) = create_store();
        assert!(!store.mark_notification_read("notif_x").unwrap());

        store.register(ana()).unwrap();
        let created = store.add_notification(NewNotification::new("info")).unwrap();
        assert!(!store.mark_notification_read("notif_x").unwrap());
        assert_eq!(store.unread_notification_count(), 1);

        assert!(store.mark_notification_read(&created.id).unwrap());
        assert!(store.mark_notification_read(&created.id).unwrap());
        assert_eq!(store.unread_notification_count(), 0);
    }

    #[test]
    fn welcome_notifications_on_register_when_enabled() {
        let settings = UserStoreSettings {
            welcome_notifications: true,
            ..Default::default()
        };
        let store = UserStore::new(Box::new(MemoryKeyValueStore::new()), settings);
        let user = store.register(ana()).unwrap();

        assert_eq!(user.notifications.len(), 2);
        assert_eq!(user.notifications[0].notification_type, "welcome");
        assert_eq!(store.unread_notification_count(), 2);
    }

    #[test]
    fn create_welcome_notifications_replaces_existing() {
        let (store, _) = create_store();
        let user = store.register(ana()).unwrap();
        store.add_notification(NewNotification::new("info")).unwrap();

        let notifications = store.create_welcome_notifications(&user.id).unwrap();
        assert_eq!(notifications.len(), 2);
        assert_eq!(store.notifications(), notifications);

        let err = store.create_welcome_notifications("user_gone").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
