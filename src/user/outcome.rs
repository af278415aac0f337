use crate::user::errors::{ErrorKind, UserStoreError};
use crate::user::user_models::UserView;
use serde::Serialize;

/// Bilingual result record for screens that show a message after each action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOutcome {
    pub success: bool,
    pub message: String,
    pub message_en: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorites: Option<Vec<String>>,
}

impl AuthOutcome {
    fn success<A: Into<String>, E: Into<String>>(message: A, message_en: E) -> Self {
        AuthOutcome {
            success: true,
            message: message.into(),
            message_en: message_en.into(),
            error_kind: None,
            user: None,
            favorites: None,
        }
    }

    pub fn failure(err: &UserStoreError) -> Self {
        AuthOutcome {
            success: false,
            message: err.message(),
            message_en: err.message_en(),
            error_kind: Some(err.kind()),
            user: None,
            favorites: None,
        }
    }

    pub fn registration(result: &Result<UserView, UserStoreError>) -> Self {
        match result {
            Ok(user) => AuthOutcome {
                user: Some(user.clone()),
                ..Self::success("تم التسجيل بنجاح", "Registration successful")
            },
            Err(err) => Self::failure(err),
        }
    }

    pub fn login(result: &Result<UserView, UserStoreError>) -> Self {
        match result {
            Ok(user) => AuthOutcome {
                user: Some(user.clone()),
                ..Self::success("تم تسجيل الدخول", "Login successful")
            },
            Err(err) => Self::failure(err),
        }
    }

    pub fn profile_update(result: &Result<UserView, UserStoreError>) -> Self {
        match result {
            Ok(user) => AuthOutcome {
                user: Some(user.clone()),
                ..Self::success("تم تحديث الملف الشخصي", "Profile updated")
            },
            Err(err) => Self::failure(err),
        }
    }

    pub fn favorites_change(added: bool, result: &Result<Vec<String>, UserStoreError>) -> Self {
        match result {
            Ok(favorites) => {
                let base = if added {
                    Self::success("تمت الإضافة إلى المفضلة", "Added to favorites")
                } else {
                    Self::success("تمت الإزالة من المفضلة", "Removed from favorites")
                };
                AuthOutcome {
                    favorites: Some(favorites.clone()),
                    ..base
                }
            }
            Err(err) => Self::failure(err),
        }
    }
}
