mod file_config;

pub use file_config::{FileConfig, StoreConfig};

use crate::storage::{
    JsonFileKeyValueStore, KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore,
};
use crate::user::{CredentialHasher, EmailPolicy, UserStore, UserStoreSettings};
use anyhow::{bail, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackend {
    Memory,
    #[default]
    JsonFile,
    Sqlite,
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub storage_backend: StorageBackend,
    pub storage_path: Option<PathBuf>,
    pub email_policy: EmailPolicy,
    pub welcome_notifications: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
    pub storage_path: Option<PathBuf>,
    pub store: UserStoreSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let storage_backend = match file.storage_backend {
            Some(name) => parse_enum::<StorageBackend>("storage_backend", &name)?,
            None => cli.storage_backend,
        };

        let storage_path = file
            .storage_path
            .map(PathBuf::from)
            .or_else(|| cli.storage_path.clone());

        if storage_backend != StorageBackend::Memory {
            let Some(path) = &storage_path else {
                bail!("storage_path must be specified via the store path argument or in config file");
            };
            let parent = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            if !parent.is_dir() {
                bail!("Storage directory does not exist: {:?}", parent);
            }
            if path.is_dir() {
                bail!("storage_path is a directory: {:?}", path);
            }
        }

        // Store settings - merge file config with defaults
        let store_file = file.store.unwrap_or_default();
        let defaults = UserStoreSettings::default();

        let email_policy = match store_file.email_policy {
            Some(name) => parse_enum::<EmailPolicy>("email_policy", &name)?,
            None => cli.email_policy,
        };
        let hasher = match store_file.hasher {
            Some(name) => CredentialHasher::from_str(&name)?,
            None => defaults.hasher,
        };

        let max_notifications = store_file
            .max_notifications
            .unwrap_or(defaults.max_notifications);
        if max_notifications == 0 {
            bail!("max_notifications must be at least 1");
        }
        let min_password_length = store_file
            .min_password_length
            .unwrap_or(defaults.min_password_length);
        if min_password_length == 0 {
            bail!("min_password_length must be at least 1");
        }

        let store = UserStoreSettings {
            users_key: store_file.users_key.unwrap_or(defaults.users_key),
            session_key: store_file.session_key.unwrap_or(defaults.session_key),
            max_notifications,
            min_password_length,
            email_policy,
            hasher,
            welcome_notifications: store_file
                .welcome_notifications
                .unwrap_or(cli.welcome_notifications),
        };
        if store.users_key == store.session_key {
            bail!("users_key and session_key must differ");
        }

        Ok(Self {
            storage_backend,
            storage_path,
            store,
        })
    }

    pub fn open_storage(&self) -> Result<Box<dyn KeyValueStore>> {
        let storage: Box<dyn KeyValueStore> = match (self.storage_backend, &self.storage_path) {
            (StorageBackend::Memory, _) => Box::new(MemoryKeyValueStore::new()),
            (StorageBackend::JsonFile, Some(path)) => Box::new(JsonFileKeyValueStore::new(path)?),
            (StorageBackend::Sqlite, Some(path)) => Box::new(SqliteKeyValueStore::new(path)?),
            (backend, None) => bail!("Backend {:?} needs a storage path", backend),
        };
        info!(
            "Opened {:?} storage at {:?}",
            self.storage_backend, self.storage_path
        );
        Ok(storage)
    }

    pub fn build_user_store(&self) -> Result<UserStore> {
        Ok(UserStore::new(self.open_storage()?, self.store.clone()))
    }
}

/// Parses a config value with clap's ValueEnum, case insensitive.
fn parse_enum<T: ValueEnum>(key: &str, value: &str) -> Result<T> {
    match T::from_str(value, true) {
        Ok(parsed) => Ok(parsed),
        Err(_) => bail!("Invalid value {:?} for {}", value, key),
    }
}
