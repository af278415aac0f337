use crate::user::errors::ValidationIssue;
use crate::user::user_models::Registration;
use clap::ValueEnum;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // local@domain.tld, no whitespace and exactly one '@' per side
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid");
}

/// How two addresses are compared for duplicate checks and login lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EmailPolicy {
    #[default]
    Exact,
    CaseInsensitive,
}

impl EmailPolicy {
    pub fn matches(&self, stored: &str, candidate: &str) -> bool {
        match self {
            EmailPolicy::Exact => stored == candidate,
            EmailPolicy::CaseInsensitive => stored.to_lowercase() == candidate.to_lowercase(),
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Checks run before any storage access. Empty strings count as missing.
pub fn validate_registration(
    registration: &Registration,
    min_password_length: usize,
) -> Result<(), ValidationIssue> {
    if registration.first_name.is_empty()
        || registration.last_name.is_empty()
        || registration.email.is_empty()
        || registration.password.is_empty()
    {
        return Err(ValidationIssue::MissingRegistrationFields);
    }
    if !is_valid_email(&registration.email) {
        return Err(ValidationIssue::InvalidEmail);
    }
    if registration.password.chars().count() < min_password_length {
        return Err(ValidationIssue::PasswordTooShort {
            min_length: min_password_length,
        });
    }
    Ok(())
}

pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationIssue> {
    if email.is_empty() || password.is_empty() {
        return Err(ValidationIssue::MissingCredentials);
    }
    Ok(())
}
