//! Deployment environment resolution

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Snapshot of process environment variables.
///
/// Every environment read during a load goes through one snapshot, so a load
/// sees a consistent view and tests can supply their own variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars {
    vars: BTreeMap<String, String>,
}

impl EnvVars {
    /// Capture the current process environment. Variables that are not valid
    /// Unicode are left out.
    pub fn capture() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvVars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

/// Value of `key`, or `default` when the variable is unset or empty.
pub fn resolve_env_value(vars: &EnvVars, key: &str, default: &str) -> String {
    match vars.get(key) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("Unknown environment '{value}' (expected one of: dev, test, staging, prod)")]
    Unknown { value: String },
}

/// Deployment environment. The tag doubles as the overlay file stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Development,
    Testing,
    Staging,
    Production,
}

impl Environment {
    pub const ALL: [Environment; 4] =
        [Self::Development, Self::Testing, Self::Staging, Self::Production];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "dev",
            Self::Testing => "test",
            Self::Staging => "staging",
            Self::Production => "prod",
        }
    }

    /// Resolve from `key` in `vars`, falling back to `default`, and parse the
    /// result. An unrecognized value is an error rather than a silent miss.
    pub fn resolve(vars: &EnvVars, key: &str, default: &str) -> Result<Self, EnvironmentError> {
        resolve_env_value(vars, key, default).parse()
    }

    pub fn is_dev(self) -> bool {
        self == Self::Development
    }

    pub fn is_testing(self) -> bool {
        self == Self::Testing
    }

    pub fn is_staging(self) -> bool {
        self == Self::Staging
    }

    pub fn is_prod(self) -> bool {
        self == Self::Production
    }
}

impl FromStr for Environment {
    type Err = EnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|env| env.as_str() == s)
            .ok_or_else(|| EnvironmentError::Unknown { value: s.to_string() })
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variable_falls_back_to_default_verbatim() {
        let vars = EnvVars::default();
        assert_eq!(resolve_env_value(&vars, "APP_ENV", "dev"), "dev");
        assert_eq!(resolve_env_value(&vars, "APP_ENV", "  Weird "), "  Weird ");
    }

    #[test]
    fn empty_variable_falls_back_to_default() {
        let vars: EnvVars = [("APP_ENV", "")].into_iter().collect();
        assert_eq!(resolve_env_value(&vars, "APP_ENV", "staging"), "staging");
    }

    #[test]
    fn set_variable_wins_over_default() {
        let vars: EnvVars = [("APP_ENV", "prod")].into_iter().collect();
        let env = Environment::resolve(&vars, "APP_ENV", "dev").expect("env");
        assert!(env.is_prod());
        assert!(!env.is_dev());
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let vars: EnvVars = [("APP_ENV", "qa")].into_iter().collect();
        let err = Environment::resolve(&vars, "APP_ENV", "dev").unwrap_err();
        assert_eq!(err, EnvironmentError::Unknown { value: "qa".to_string() });
    }

    #[test]
    fn tags_are_exact() {
        assert!("Prod".parse::<Environment>().is_err());
        assert!("production".parse::<Environment>().is_err());
        for env in Environment::ALL {
            assert_eq!(env.as_str().parse::<Environment>(), Ok(env));
            assert_eq!(env.to_string(), env.as_str());
        }
    }

    #[test]
    fn predicates_match_one_member_each() {
        assert!(Environment::Development.is_dev());
        assert!(Environment::Testing.is_testing());
        assert!(Environment::Staging.is_staging());
        assert!(Environment::Production.is_prod());
        assert!(!Environment::Staging.is_testing());
    }
}
