use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub storage_backend: Option<String>,
    pub storage_path: Option<String>,

    // Account store tuning
    pub store: Option<StoreConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct StoreConfig {
    pub users_key: Option<String>,
    pub session_key: Option<String>,
    pub max_notifications: Option<usize>,
    pub min_password_length: Option<usize>,
    /// "exact" or "case-insensitive"
    pub email_policy: Option<String>,
    /// "argon2"
    pub hasher: Option<String>,
    pub welcome_notifications: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
