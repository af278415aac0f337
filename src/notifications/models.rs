//! Notification data models

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Screen a notification points to when it carries no link of its own.
pub const DEFAULT_NOTIFICATION_LINK: &str = "notifications.html";

/// Display language for bilingual texts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Ar,
    #[default]
    En,
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ar" => Ok(Locale::Ar),
            "en" => Ok(Locale::En),
            _ => bail!("Unknown locale {}", s),
        }
    }
}

/// A notification attached to one user.
///
/// Texts come in Arabic (`title`, `message`) and English (`title_en`,
/// `message_en`) pairs; either side may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub title_en: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub message_en: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

fn pick<'a>(locale: Locale, arabic: &'a str, english: &'a str) -> &'a str {
    let (preferred, fallback) = match locale {
        Locale::Ar => (arabic, english),
        Locale::En => (english, arabic),
    };
    if preferred.is_empty() {
        fallback
    } else {
        preferred
    }
}

impl Notification {
    pub fn localized_title(&self, locale: Locale) -> &str {
        pick(locale, &self.title, &self.title_en)
    }

    pub fn localized_message(&self, locale: Locale) -> &str {
        pick(locale, &self.message, &self.message_en)
    }

    pub fn link_or_default(&self) -> &str {
        self.link.as_deref().unwrap_or(DEFAULT_NOTIFICATION_LINK)
    }
}

/// Caller-supplied part of a notification. The store assigns id, read flag
/// and timestamp.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewNotification {
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub title_en: String,
    pub message: String,
    pub message_en: String,
    pub link: Option<String>,
}

impl NewNotification {
    pub fn new<T: Into<String>>(notification_type: T) -> Self {
        NewNotification {
            notification_type: notification_type.into(),
            ..Default::default()
        }
    }

    pub fn with_title<A: Into<String>, E: Into<String>>(mut self, arabic: A, english: E) -> Self {
        self.title = arabic.into();
        self.title_en = english.into();
        self
    }

    pub fn with_message<A: Into<String>, E: Into<String>>(mut self, arabic: A, english: E) -> Self {
        self.message = arabic.into();
        self.message_en = english.into();
        self
    }

    pub fn with_link<T: Into<String>>(mut self, link: T) -> Self {
        self.link = Some(link.into());
        self
    }

    pub(crate) fn into_notification(self, id: String, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id,
            notification_type: self.notification_type,
            title: self.title,
            title_en: self.title_en,
            message: self.message,
            message_en: self.message_en,
            read: false,
            created_at,
            link: self.link,
        }
    }
}
