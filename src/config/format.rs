//! Supported configuration document formats

use figment::value::Dict;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigTypeError {
    #[error("Unsupported config type '{value}' (expected one of: json, yaml, yml, toml)")]
    Unknown { value: String },
}

/// A document that could not be parsed as its configured format.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid {format} in {origin}: {message}")]
pub struct ParseError {
    pub origin: String,
    pub format: ConfigType,
    pub message: String,
}

/// Serialization format of the base and overlay documents.
///
/// The tag is also the file extension, so `Yaml` and `Yml` parse the same way
/// but look for different file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigType {
    Json,
    Yaml,
    Yml,
    Toml,
}

impl ConfigType {
    pub const ALL: [ConfigType; 4] = [Self::Json, Self::Yaml, Self::Yml, Self::Toml];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Yml => "yml",
            Self::Toml => "toml",
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }

    /// `<stem>.<extension>`
    pub fn file_name(self, stem: &str) -> String {
        format!("{}.{}", stem, self.extension())
    }

    /// Parse raw document bytes into a key/value tree.
    ///
    /// A document that is empty or only whitespace is an empty map. The top
    /// level must be a map; anything else is rejected.
    pub fn parse_document(self, bytes: &[u8], origin: &str) -> Result<Dict, ParseError> {
        let err =
            |message: String| ParseError { origin: origin.to_string(), format: self, message };

        let text = std::str::from_utf8(bytes).map_err(|e| err(format!("not valid UTF-8: {e}")))?;
        if text.trim().is_empty() {
            return Ok(Dict::new());
        }

        match self {
            Self::Json => serde_json::from_str::<Dict>(text).map_err(|e| err(e.to_string())),
            Self::Yaml | Self::Yml => {
                serde_yaml::from_str::<Dict>(text).map_err(|e| err(e.to_string()))
            }
            Self::Toml => toml::from_str::<Dict>(text).map_err(|e| err(e.to_string())),
        }
    }
}

impl FromStr for ConfigType {
    type Err = ConfigTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == lower)
            .ok_or_else(|| ConfigTypeError::Unknown { value: s.to_string() })
    }
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
