//! Layered config loading
//!
//! Precedence, lowest to highest:
//!
//! 1. Base document (`<base>.<ext>`)
//! 2. Environment overlay (`<env>.<ext>`)
//! 3. Prefixed environment variables for keys the documents define
//!    (`db.host` ← `APP_DB_HOST`)
//! 4. Secret-store files (`APP_db_host` → `db.host`)
//!
//! Maps merge recursively; any other value in a higher layer replaces the
//! lower one. Variables and secrets are strings; they become a number or a
//! bool only when the document value they replace has that type and the
//! string parses exactly.

use figment::value::{Dict, Map, Num, Tag, Value};
use figment::{Figment, Metadata, Profile, Provider};
use serde::de::DeserializeOwned;
use std::io;
use std::path::PathBuf;

use super::environment::{EnvVars, Environment, EnvironmentError};
use super::format::{ConfigType, ParseError};
use super::source::ConfigSource;
use crate::secrets::{load_secrets, secrets_dir_from, SecretLoadError, SecretMap};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error("Failed getting secrets from secret store files")]
    Secrets(#[from] SecretLoadError),

    #[error("Failed reading config file {name} from {location}")]
    Read {
        name: String,
        location: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Failed to merge config layers")]
    Merge(#[source] figment::Error),

    #[error("Failed to decode merged configuration")]
    Decode(#[source] figment::Error),
}

/// What to load and how to find it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Variable naming the environment, e.g. `APP_ENV`.
    pub env_key: String,
    /// Environment used when `env_key` is unset or empty.
    pub default_env: String,
    /// Prefix for bound variables and secret file names, e.g. `app`.
    pub env_prefix: String,
    pub config_type: ConfigType,
    /// Variable naming the secret-store directory. `None` disables secrets.
    pub secrets_dir_key: Option<String>,
    /// Bind `UPPER(env_prefix)_*` variables onto config keys.
    pub bind_env: bool,
}

impl LoadRequest {
    pub fn new(
        env_key: impl Into<String>,
        default_env: impl Into<String>,
        env_prefix: impl Into<String>,
        config_type: ConfigType,
    ) -> Self {
        Self {
            env_key: env_key.into(),
            default_env: default_env.into(),
            env_prefix: env_prefix.into(),
            config_type,
            secrets_dir_key: None,
            bind_env: true,
        }
    }

    pub fn secrets_dir_key(mut self, key: impl Into<String>) -> Self {
        self.secrets_dir_key = Some(key.into());
        self
    }

    pub fn bind_env(mut self, enabled: bool) -> Self {
        self.bind_env = enabled;
        self
    }
}

/// The merged configuration together with the environment it was built for.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    environment: Environment,
    figment: Figment,
    files: [String; 2],
    secret_keys: Vec<String>,
}

impl LoadedConfig {
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Base and overlay file names, in merge order.
    pub fn files(&self) -> &[String; 2] {
        &self.files
    }

    /// Keys that were overridden from the secret store.
    pub fn secret_keys(&self) -> &[String] {
        &self.secret_keys
    }

    pub fn figment(&self) -> &Figment {
        &self.figment
    }

    /// Decode the whole merged tree.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, LoadError> {
        self.figment.extract().map_err(LoadError::Decode)
    }

    /// Decode the subtree at dotted `key`.
    pub fn extract_inner<T: DeserializeOwned>(&self, key: &str) -> Result<T, LoadError> {
        self.figment.extract_inner(key).map_err(LoadError::Decode)
    }

    pub fn to_value(&self) -> Result<serde_json::Value, LoadError> {
        self.extract()
    }
}

/// A decoded configuration and the environment it was resolved for.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub environment: Environment,
    pub config: T,
}

/// Builds a [`LoadedConfig`] from a [`LoadRequest`].
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    request: LoadRequest,
}

impl ConfigLoader {
    pub fn new(request: LoadRequest) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &LoadRequest {
        &self.request
    }

    /// Load against the current process environment.
    pub fn load<S: ConfigSource>(
        &self,
        source: &S,
        base_name: &str,
    ) -> Result<LoadedConfig, LoadError> {
        self.load_with_env(source, base_name, &EnvVars::capture())
    }

    /// Load against an explicit environment snapshot.
    pub fn load_with_env<S: ConfigSource>(
        &self,
        source: &S,
        base_name: &str,
        vars: &EnvVars,
    ) -> Result<LoadedConfig, LoadError> {
        let request = &self.request;

        let environment = Environment::resolve(vars, &request.env_key, &request.default_env)?;
        tracing::debug!(environment = %environment, key = %request.env_key, "Resolved environment");

        let secrets_dir = match &request.secrets_dir_key {
            Some(key) => secrets_dir_from(vars, key),
            None => PathBuf::new(),
        };
        let secrets = load_secrets(&secrets_dir, &request.env_prefix)?;
        tracing::debug!(count = secrets.len(), dir = %secrets_dir.display(), "Loaded secrets");

        let base_file = request.config_type.file_name(base_name);
        let env_file = request.config_type.file_name(environment.as_str());

        let base = read_document(source, request.config_type, &base_file)?;
        let overlay = read_document(source, request.config_type, &env_file)?;

        let mut figment = Figment::new()
            .merge(Layer::new(format!("base config {base_file}"), base))
            .merge(Layer::new(format!("{environment} config {env_file}"), overlay));

        let merged: Dict = figment.extract().map_err(LoadError::Merge)?;

        if request.bind_env {
            let bound = bind_env_vars(&merged, vars, &request.env_prefix);
            tracing::debug!(
                count = bound.len(),
                prefix = %request.env_prefix,
                "Bound environment variables"
            );
            figment = figment.merge(Layer::new(
                format!("environment variables {}*", env_var_name(&request.env_prefix, "")),
                bound,
            ));
        }

        let secret_keys: Vec<String> = secrets.keys().cloned().collect();
        if !secrets.is_empty() {
            figment = figment.merge(Layer::new(
                format!("secret store {}", secrets_dir.display()),
                secrets_to_dict(&merged, secrets),
            ));
        }

        Ok(LoadedConfig { environment, figment, files: [base_file, env_file], secret_keys })
    }
}

/// Load and decode in one step against the current process environment.
pub fn load<T: DeserializeOwned>(
    request: &LoadRequest,
    source: &impl ConfigSource,
    base_name: &str,
) -> Result<Loaded<T>, LoadError> {
    let loaded = ConfigLoader::new(request.clone()).load(source, base_name)?;
    let config = loaded.extract()?;
    Ok(Loaded { environment: loaded.environment(), config })
}

fn read_document<S: ConfigSource>(
    source: &S,
    config_type: ConfigType,
    name: &str,
) -> Result<Dict, LoadError> {
    let bytes = source.read(name).map_err(|source_err| LoadError::Read {
        name: name.to_string(),
        location: source.describe(),
        source: source_err,
    })?;
    tracing::debug!(file = %name, bytes = bytes.len(), "Read config file");
    Ok(config_type.parse_document(&bytes, name)?)
}

/// Variable bound to dotted `key`: `db.max_conns` → `APP_DB_MAX_CONNS`, or
/// `DB_MAX_CONNS` when the prefix is empty.
fn env_var_name(env_prefix: &str, key: &str) -> String {
    let key = key.replace('.', "_").to_uppercase();
    if env_prefix.is_empty() {
        key
    } else {
        format!("{}_{key}", env_prefix.to_uppercase())
    }
}

/// Override every leaf key of `merged` whose variable is set and non-empty.
fn bind_env_vars(merged: &Dict, vars: &EnvVars, env_prefix: &str) -> Dict {
    let mut leaves = Vec::new();
    collect_leaves(merged, "", &mut leaves);

    let mut dict = Dict::new();
    for (key, current) in leaves {
        let var = env_var_name(env_prefix, &key);
        let Some(raw) = vars.get(&var).filter(|v| !v.is_empty()) else {
            continue;
        };
        insert_dotted(&mut dict, &key, coerce_like(Some(current), raw));
    }
    dict
}

fn collect_leaves<'a>(dict: &'a Dict, parent: &str, out: &mut Vec<(String, &'a Value)>) {
    for (name, value) in dict {
        let key = if parent.is_empty() { name.clone() } else { format!("{parent}.{name}") };
        match value.as_dict() {
            Some(child) if !child.is_empty() => collect_leaves(child, &key, out),
            _ => out.push((key, value)),
        }
    }
}

fn secrets_to_dict(merged: &Dict, secrets: SecretMap) -> Dict {
    let mut dict = Dict::new();
    for (key, value) in secrets {
        let current = find_dotted(merged, &key);
        insert_dotted(&mut dict, &key, coerce_like(current, &value));
    }
    dict
}

/// Type `raw` after the value it replaces. Anything that does not parse
/// exactly stays the untouched string.
fn coerce_like(current: Option<&Value>, raw: &str) -> Value {
    match current {
        Some(Value::Bool(..)) => {
            if let Ok(b) = raw.parse::<bool>() {
                return Value::Bool(Tag::Default, b);
            }
        }
        Some(Value::Num(_, num)) => {
            let parsed = if matches!(num, Num::F32(_) | Num::F64(_)) {
                raw.parse::<f64>().ok().map(Num::F64)
            } else if let Ok(n) = raw.parse::<u64>() {
                Some(Num::U64(n))
            } else if let Ok(n) = raw.parse::<i64>() {
                Some(Num::I64(n))
            } else {
                raw.parse::<f64>().ok().map(Num::F64)
            };
            if let Some(num) = parsed {
                return Value::Num(Tag::Default, num);
            }
        }
        _ => {}
    }
    Value::String(Tag::Default, raw.to_string())
}

fn find_dotted<'a>(dict: &'a Dict, key: &str) -> Option<&'a Value> {
    match key.split_once('.') {
        None => dict.get(key),
        Some((head, rest)) => find_dotted(dict.get(head)?.as_dict()?, rest),
    }
}

/// Set `value` at dotted `key`, replacing non-map values on the way down.
fn insert_dotted(dict: &mut Dict, key: &str, value: Value) {
    let Some((head, rest)) = key.split_once('.') else {
        dict.insert(key.to_string(), value);
        return;
    };
    let entry =
        dict.entry(head.to_string()).or_insert_with(|| Value::Dict(Tag::Default, Dict::new()));
    if entry.as_dict().is_none() {
        *entry = Value::Dict(Tag::Default, Dict::new());
    }
    if let Value::Dict(_, child) = entry {
        insert_dotted(child, rest, value);
    }
}

/// One named layer of the merge.
struct Layer {
    name: String,
    dict: Dict,
}

impl Layer {
    fn new(name: String, dict: Dict) -> Self {
        Self { name, dict }
    }
}

impl Provider for Layer {
    fn metadata(&self) -> Metadata {
        Metadata::named(self.name.clone())
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Ok(Map::from([(Profile::Default, self.dict.clone())]))
    }
}
