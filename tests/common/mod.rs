//! Common test infrastructure
//!
//! Builds isolated account stores over every storage backend. Tests should
//! only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestStore, ANA_EMAIL, ANA_PASS};
//!
//! #[test]
//! fn test_login() {
//!     let store = TestStore::memory();
//!     store.register_ana();
//!     assert!(store.login(ANA_EMAIL, ANA_PASS).is_ok());
//! }
//! ```

mod constants;
mod fixtures;

// Public API - this is what tests import
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{test_settings, RecordingNavigator, TestStore};
