//! Source formats and the external decoders behind them.
//!
//! A format is picked from a hint: a bare extension (`"toml"`) or one with a
//! leading dot as returned by path APIs (`".toml"`). Matching is case-sensitive.
//!
//! | Hint | Format | Decoder |
//! |------|--------|---------|
//! | `toml`, `.toml` | [`Format::Toml`] | `toml` |
//! | `yaml`, `.yaml`, `yml`, `.yml` | [`Format::Yaml`] | `serde_yaml` |
//! | `json`, `.json` | [`Format::Json`] | `serde_yaml` |
//!
//! JSON is read by the YAML decoder: every JSON document is also a YAML one.

use std::fmt;
use std::str::FromStr;

use crate::error::SourceError;
use crate::raw::RawMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Yaml,
    Json,
}

impl Format {
    /// Pick the format named by an extension hint.
    pub fn from_hint(hint: &str) -> Result<Self, SourceError> {
        match hint {
            "toml" | ".toml" => Ok(Self::Toml),
            "yaml" | ".yaml" | "yml" | ".yml" => Ok(Self::Yaml),
            "json" | ".json" => Ok(Self::Json),
            other => Err(SourceError::UnsupportedExtension(other.to_owned())),
        }
    }

    /// Decode `data` into a generic mapping.
    ///
    /// An empty YAML or JSON document is an empty mapping.
    pub(crate) fn parse(self, data: &[u8]) -> Result<RawMap, SourceError> {
        match self {
            Self::Toml => {
                let text = std::str::from_utf8(data)?;
                Ok(toml::from_str(text)?)
            }
            Self::Yaml | Self::Json => {
                if data.iter().all(u8::is_ascii_whitespace) {
                    return Ok(RawMap::new());
                }
                let mapping: Option<RawMap> = serde_yaml::from_slice(data)?;
                Ok(mapping.unwrap_or_default())
            }
        }
    }
}

impl FromStr for Format {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hint(s)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toml => f.write_str("toml"),
            Self::Yaml => f.write_str("yaml"),
            Self::Json => f.write_str("json"),
        }
    }
}
