//! File-based secret store
//!
//! Each secret is one file named `<PREFIX>_<key>` where `<PREFIX>` is the
//! upper-cased environment prefix and underscores in `<key>` mark nesting:
//! `APP_db_password` becomes `db.password`. The file's contents, untrimmed,
//! are the value. Secrets keep credentials out of committed config files.

pub mod store;

pub use store::{load_secrets, secret_key, secrets_dir_from, SecretErrorKind, SecretLoadError};

use std::collections::BTreeMap;

/// Dotted configuration key → raw secret value.
pub type SecretMap = BTreeMap<String, String>;
