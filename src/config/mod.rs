//! Configuration loading and merging
//!
//! Handles the base document, the per-environment overlay, prefixed
//! environment variables and secret overrides with proper precedence
//! (Secrets > Env > Overlay > Base).

pub mod environment;
pub mod format;
pub mod loader;
pub mod source;

pub use environment::{resolve_env_value, EnvVars, Environment, EnvironmentError};
pub use format::{ConfigType, ConfigTypeError, ParseError};
pub use loader::{load, ConfigLoader, LoadError, LoadRequest, Loaded, LoadedConfig};
pub use source::{ConfigSource, DirSource, MemorySource};
