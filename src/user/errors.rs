use serde::Serialize;
use thiserror::Error;

/// Coarse error category, stable across message wording changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    DuplicateEmail,
    NotFound,
    InvalidCredentials,
    Unauthenticated,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("all registration fields are required")]
    MissingRegistrationFields,
    #[error("email and password are required")]
    MissingCredentials,
    #[error("first and last name cannot be empty")]
    EmptyName,
    #[error("invalid email address")]
    InvalidEmail,
    #[error("password must be at least {min_length} characters")]
    PasswordTooShort { min_length: usize },
}

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationIssue),

    #[error("Email {0} is already registered")]
    DuplicateEmail(String),

    #[error("No user registered with email {0}")]
    EmailNotRegistered(String),

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Incorrect password")]
    InvalidCredentials,

    #[error("Not logged in")]
    Unauthenticated,

    #[error("Internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl UserStoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UserStoreError::Validation(_) => ErrorKind::Validation,
            UserStoreError::DuplicateEmail(_) => ErrorKind::DuplicateEmail,
            UserStoreError::EmailNotRegistered(_) | UserStoreError::UserNotFound(_) => {
                ErrorKind::NotFound
            }
            UserStoreError::InvalidCredentials => ErrorKind::InvalidCredentials,
            UserStoreError::Unauthenticated => ErrorKind::Unauthenticated,
            UserStoreError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// User-facing Arabic message.
    pub fn message(&self) -> String {
        match self {
            UserStoreError::Validation(issue) => match issue {
                ValidationIssue::MissingRegistrationFields => "جميع الحقول مطلوبة".to_string(),
                ValidationIssue::MissingCredentials => "البريد وكلمة المرور مطلوبان".to_string(),
                ValidationIssue::EmptyName => "الاسم لا يمكن أن يكون فارغاً".to_string(),
                ValidationIssue::InvalidEmail => "البريد الإلكتروني غير صحيح".to_string(),
                ValidationIssue::PasswordTooShort { min_length } => {
                    format!("كلمة المرور يجب أن تكون {} أحرف على الأقل", min_length)
                }
            },
            UserStoreError::DuplicateEmail(_) => "هذا البريد مسجل بالفعل".to_string(),
            UserStoreError::EmailNotRegistered(_) => "البريد غير مسجل".to_string(),
            UserStoreError::UserNotFound(_) => "المستخدم غير موجود".to_string(),
            UserStoreError::InvalidCredentials => "كلمة المرور غير صحيحة".to_string(),
            UserStoreError::Unauthenticated => "يجب تسجيل الدخول أولاً".to_string(),
            UserStoreError::Internal(_) => "حدث خطأ غير متوقع".to_string(),
        }
    }

    /// User-facing English message.
    pub fn message_en(&self) -> String {
        match self {
            UserStoreError::Validation(issue) => match issue {
                ValidationIssue::MissingRegistrationFields => "All fields are required".to_string(),
                ValidationIssue::MissingCredentials => "Email and password required".to_string(),
                ValidationIssue::EmptyName => "Name cannot be empty".to_string(),
                ValidationIssue::InvalidEmail => "Invalid email address".to_string(),
                ValidationIssue::PasswordTooShort { min_length } => {
                    format!("Password must be at least {} characters", min_length)
                }
            },
            UserStoreError::DuplicateEmail(_) => "Email already registered".to_string(),
            UserStoreError::EmailNotRegistered(_) => "Email not registered".to_string(),
            UserStoreError::UserNotFound(_) => "User not found".to_string(),
            UserStoreError::InvalidCredentials => "Incorrect password".to_string(),
            UserStoreError::Unauthenticated => "Please log in first".to_string(),
            UserStoreError::Internal(_) => "Something went wrong".to_string(),
        }
    }
}
