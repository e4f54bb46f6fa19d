//! JSON:API envelopes for the handful of resources the helper touches.
//!
//! Resources are kept as pass-through JSON; only `type`, `id` and
//! `attributes` are lifted into fields.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_LOCALE: &str = "en-US";
pub const DEFAULT_VERSION_STRING: &str = "0.1.0";

/// A `{"data": ...}` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<D> {
    pub data: D,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    /// Relationships, links and anything else, untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource {
    /// Attribute rendered for display; strings unquoted, absent as "N/A".
    pub fn attribute_text(&self, key: &str) -> String {
        match self.attributes.get(key) {
            None | Some(Value::Null) => "N/A".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    #[default]
    MacOs,
    Ios,
    TvOs,
    VisionOs,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::MacOs => "MAC_OS",
            Platform::Ios => "IOS",
            Platform::TvOs => "TV_OS",
            Platform::VisionOs => "VISION_OS",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePlatformError(String);

impl fmt::Display for ParsePlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown platform '{}' (expected MAC_OS, IOS, TV_OS or VISION_OS)",
            self.0
        )
    }
}

impl std::error::Error for ParsePlatformError {}

impl FromStr for Platform {
    type Err = ParsePlatformError;

    /// Accepts the wire name in any case, with or without underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match normalized.as_str() {
            "MACOS" => Ok(Platform::MacOs),
            "IOS" => Ok(Platform::Ios),
            "TVOS" => Ok(Platform::TvOs),
            "VISIONOS" => Ok(Platform::VisionOs),
            _ => Err(ParsePlatformError(s.to_string())),
        }
    }
}

/// Attributes for registering a new app record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApp {
    pub bundle_id: String,
    pub name: String,
    pub platform: Platform,
    pub primary_locale: String,
}

impl NewApp {
    pub fn to_document(&self) -> Value {
        json!({
            "data": {
                "type": "apps",
                "attributes": {
                    "bundleId": self.bundle_id,
                    "name": self.name,
                    "platform": self.platform,
                    "primaryLocale": self.primary_locale,
                }
            }
        })
    }
}

/// Attributes for a new store version attached to an app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVersion {
    pub app_id: String,
    pub platform: Platform,
    pub version_string: String,
}

impl NewVersion {
    pub fn to_document(&self) -> Value {
        json!({
            "data": {
                "type": "appStoreVersions",
                "attributes": {
                    "platform": self.platform,
                    "versionString": self.version_string,
                },
                "relationships": {
                    "app": {
                        "data": { "type": "apps", "id": self.app_id }
                    }
                }
            }
        })
    }
}

/// Body for `PATCH apps/{id}`.
pub fn app_update_document(app_id: &str, attributes: &Map<String, Value>) -> Value {
    json!({
        "data": {
            "type": "apps",
            "id": app_id,
            "attributes": attributes,
        }
    })
}

/// Parse a `key=value` pair; values that parse as JSON keep their type.
pub fn parse_attribute(pair: &str) -> Result<(String, Value), String> {
    let (key, raw) = pair
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", pair))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty attribute name in '{}'", pair));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
