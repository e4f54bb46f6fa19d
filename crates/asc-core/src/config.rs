//! Credentials and app identity for the App Store Connect helper.
//!
//! Values come from a flat JSON file and can be overridden by `ASC_*`
//! environment variables.

use crate::auth::ApiCredential;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "appstore_config.json";

pub const DEFAULT_BUNDLE_ID: &str = "de.slohmaier.mousecross";
pub const DEFAULT_APP_NAME: &str = "MouseCross";

pub const ENV_KEY_ID: &str = "ASC_KEY_ID";
pub const ENV_ISSUER_ID: &str = "ASC_ISSUER_ID";
pub const ENV_PRIVATE_KEY_PATH: &str = "ASC_PRIVATE_KEY_PATH";
pub const ENV_BUNDLE_ID: &str = "ASC_BUNDLE_ID";
pub const ENV_APP_NAME: &str = "ASC_APP_NAME";

const PLACEHOLDER_KEY_ID: &str = "YOUR_API_KEY_ID";
const PLACEHOLDER_ISSUER_ID: &str = "YOUR_ISSUER_ID";
const PLACEHOLDER_KEY_PATH: &str = "path/to/AuthKey_KEYID.p8";

/// Error type for configuration handling.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    /// Required credential fields are absent (names as they appear in the file)
    MissingFields(Vec<&'static str>),
    /// Refusing to overwrite an existing config file
    AlreadyExists(PathBuf),
    PrivateKey { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to access {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid config file {}: {}", path.display(), source)
            }
            ConfigError::MissingFields(fields) => {
                write!(f, "missing credentials: {}", fields.join(", "))
            }
            ConfigError::AlreadyExists(path) => {
                write!(f, "config file already exists: {}", path.display())
            }
            ConfigError::PrivateKey { path, source } => {
                write!(f, "cannot read private key {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } | ConfigError::PrivateKey { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AscConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
}

impl AscConfig {
    /// The file written by `--setup`, with placeholders to fill in.
    pub fn template() -> Self {
        AscConfig {
            key_id: Some(PLACEHOLDER_KEY_ID.to_string()),
            issuer_id: Some(PLACEHOLDER_ISSUER_ID.to_string()),
            private_key_path: Some(PLACEHOLDER_KEY_PATH.to_string()),
            bundle_id: Some(DEFAULT_BUNDLE_ID.to_string()),
            app_name: Some(DEFAULT_APP_NAME.to_string()),
        }
    }

    pub fn load(path: &Path) -> Result<AscConfig, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, content).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write the template to `path` unless something is already there.
    pub fn write_template(path: &Path) -> Result<AscConfig, ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        let template = Self::template();
        template.save(path)?;
        Ok(template)
    }

    /// Read values from the environment only.
    pub fn from_environment<F>(lookup: F) -> AscConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        AscConfig {
            key_id: get(ENV_KEY_ID),
            issuer_id: get(ENV_ISSUER_ID),
            private_key_path: get(ENV_PRIVATE_KEY_PATH),
            bundle_id: get(ENV_BUNDLE_ID),
            app_name: get(ENV_APP_NAME),
        }
    }

    /// Load `path` if it exists, then apply environment overrides.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn resolve<F>(path: &Path, lookup: F) -> Result<AscConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = if path.exists() {
            log::debug!("reading config from {}", path.display());
            Self::load(path)?
        } else {
            log::debug!("no config file at {}; using environment only", path.display());
            AscConfig::default()
        };
        Ok(Self::from_environment(lookup).or(file))
    }

    /// Fill every unset field of `self` from `fallback`.
    pub fn or(self, fallback: AscConfig) -> AscConfig {
        AscConfig {
            key_id: self.key_id.or(fallback.key_id),
            issuer_id: self.issuer_id.or(fallback.issuer_id),
            private_key_path: self.private_key_path.or(fallback.private_key_path),
            bundle_id: self.bundle_id.or(fallback.bundle_id),
            app_name: self.app_name.or(fallback.app_name),
        }
    }

    pub fn bundle_id(&self) -> &str {
        self.bundle_id.as_deref().unwrap_or(DEFAULT_BUNDLE_ID)
    }

    pub fn app_name(&self) -> &str {
        self.app_name.as_deref().unwrap_or(DEFAULT_APP_NAME)
    }

    /// Credential fields that are unset, blank, or still the template placeholder.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let checks: [(&'static str, &Option<String>, &str); 3] = [
            ("key_id", &self.key_id, PLACEHOLDER_KEY_ID),
            ("issuer_id", &self.issuer_id, PLACEHOLDER_ISSUER_ID),
            ("private_key_path", &self.private_key_path, PLACEHOLDER_KEY_PATH),
        ];

        checks
            .into_iter()
            .filter(|(_, value, placeholder)| match value.as_deref().map(str::trim) {
                None | Some("") => true,
                Some(v) => v == *placeholder,
            })
            .map(|(name, _, _)| name)
            .collect()
    }

    /// Build the signing credential, reading the private key from disk.
    pub fn credential(&self) -> Result<ApiCredential, ConfigError> {
        let missing = self.missing_credentials();
        let (Some(key_id), Some(issuer_id), Some(key_path)) = (
            self.key_id.as_deref(),
            self.issuer_id.as_deref(),
            self.private_key_path.as_deref(),
        ) else {
            return Err(ConfigError::MissingFields(missing));
        };
        if !missing.is_empty() {
            return Err(ConfigError::MissingFields(missing));
        }

        let key_path = PathBuf::from(key_path.trim());
        let private_key = fs::read(&key_path).map_err(|e| ConfigError::PrivateKey {
            path: key_path.clone(),
            source: e,
        })?;

        Ok(ApiCredential {
            key_id: key_id.trim().to_string(),
            issuer_id: issuer_id.trim().to_string(),
            private_key,
        })
    }
}

/// Environment lookup backed by the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
