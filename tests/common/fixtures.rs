#![allow(dead_code)]

use super::constants::*;
use estate_accounts::{
    JsonFileKeyValueStore, MemoryKeyValueStore, Navigator, Registration, SqliteKeyValueStore,
    UserStore, UserStoreSettings, UserView,
};
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Navigator that remembers every target it was asked to show.
#[derive(Clone, Default)]
pub struct RecordingNavigator {
    targets: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&self, target: &str) {
        self.targets.lock().unwrap().push(target.to_owned());
    }
}

/// Default settings, with the instant hasher when the crate is built with
/// `test-fast-hasher`.
pub fn test_settings() -> UserStoreSettings {
    UserStoreSettings {
        #[cfg(feature = "test-fast-hasher")]
        hasher: estate_accounts::user::CredentialHasher::TestFast,
        ..Default::default()
    }
}

/// A [`UserStore`] plus whatever keeps its backing alive.
pub struct TestStore {
    store: UserStore,
    pub navigator: RecordingNavigator,
    pub memory: Option<MemoryKeyValueStore>,
    temp_dir: Option<TempDir>,
}

impl Deref for TestStore {
    type Target = UserStore;

    fn deref(&self) -> &UserStore {
        &self.store
    }
}

impl TestStore {
    fn wrap(
        store: UserStore,
        memory: Option<MemoryKeyValueStore>,
        temp_dir: Option<TempDir>,
    ) -> Self {
        let navigator = RecordingNavigator::default();
        TestStore {
            store: store.with_navigator(Box::new(navigator.clone())),
            navigator,
            memory,
            temp_dir,
        }
    }

    pub fn memory() -> Self {
        Self::memory_with(test_settings())
    }

    pub fn memory_with(settings: UserStoreSettings) -> Self {
        let backing = MemoryKeyValueStore::new();
        let store = UserStore::new(Box::new(backing.clone()), settings);
        Self::wrap(store, Some(backing), None)
    }

    pub fn json_file() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let backing = JsonFileKeyValueStore::new(temp_dir.path().join("accounts.json")).unwrap();
        let store = UserStore::new(Box::new(backing), test_settings());
        Self::wrap(store, None, Some(temp_dir))
    }

    pub fn sqlite() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let backing = SqliteKeyValueStore::new(temp_dir.path().join("accounts.db")).unwrap();
        let store = UserStore::new(Box::new(backing), test_settings());
        Self::wrap(store, None, Some(temp_dir))
    }

    pub fn all_backends() -> Vec<(&'static str, TestStore)> {
        vec![
            ("memory", Self::memory()),
            ("json-file", Self::json_file()),
            ("sqlite", Self::sqlite()),
        ]
    }

    pub fn dir(&self) -> Option<PathBuf> {
        self.temp_dir.as_ref().map(|dir| dir.path().to_path_buf())
    }

    pub fn register_ana(&self) -> UserView {
        self.register(Registration::new(
            ANA_FIRST_NAME,
            ANA_LAST_NAME,
            ANA_EMAIL,
            ANA_PASS,
        ))
        .unwrap()
    }

    pub fn register_omar(&self) -> UserView {
        self.register(
            Registration::new(OMAR_FIRST_NAME, OMAR_LAST_NAME, OMAR_EMAIL, OMAR_PASS)
                .with_phone("+20 100 000 0000"),
        )
        .unwrap()
    }
}
