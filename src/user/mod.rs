pub mod auth;
pub mod errors;
mod outcome;
pub mod user_models;
mod user_store;
pub mod validation;

pub use auth::{CredentialHasher, PasswordDigest};
pub use errors::{ErrorKind, UserStoreError, ValidationIssue};
pub use outcome::AuthOutcome;
pub use user_models::{ProfileUpdate, Registration, Session, User, UserSettings, UserView};
pub use user_store::{
    StoreResult, UserStore, UserStoreSettings, DEFAULT_SESSION_KEY, DEFAULT_USERS_KEY,
    MAX_NOTIFICATIONS, MIN_PASSWORD_LENGTH,
};
pub use validation::EmailPolicy;
