//! envlayer: layered per-environment configuration loading
//!
//! Resolves a deployment environment, merges a base configuration document with
//! the environment's overlay, binds prefixed environment variables, overrides
//! keys with secrets discovered in a secret-store directory, and decodes the
//! result into any `serde::Deserialize` type.
//!
//! ```rust,ignore
//! use envlayer::{load, ConfigType, DirSource, LoadRequest};
//!
//! let request = LoadRequest::new("APP_ENV", "dev", "app", ConfigType::Yaml)
//!     .secrets_dir_key("APP_SECRETS_DIR");
//! let loaded = load::<AppConfig>(&request, &DirSource::new("config"), "base")?;
//! if loaded.environment.is_prod() { /* ... */ }
//! ```

pub mod config;
pub mod secrets;

pub use config::{
    load, ConfigLoader, ConfigSource, ConfigType, ConfigTypeError, DirSource, EnvVars,
    Environment, EnvironmentError, LoadError, LoadRequest, Loaded, LoadedConfig, MemorySource,
    ParseError,
};
pub use secrets::{load_secrets, SecretLoadError, SecretMap};
