pub mod apps;
pub mod builds;
pub mod setup;

use asc_core::config::{process_env, ENV_ISSUER_ID, ENV_KEY_ID, ENV_PRIVATE_KEY_PATH};
use asc_core::{ApiError, AppStoreClient, AscConfig, ConfigError, Resource};
use std::fmt;
use std::path::{Path, PathBuf};

/// Error type for helper commands.
#[derive(Debug)]
pub enum CommandError {
    /// Credentials are not configured; no request was made
    MissingCredentials { fields: Vec<&'static str>, config_path: PathBuf },
    Config(ConfigError),
    Api(ApiError),
    NotFound(String),
    Usage(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::MissingCredentials {
                fields,
                config_path,
            } => write!(
                f,
                "missing required configuration: {}\n\
                 Set them in {} or via {}, {} and {}. Run with --setup to create a template.",
                fields.join(", "),
                config_path.display(),
                ENV_KEY_ID,
                ENV_ISSUER_ID,
                ENV_PRIVATE_KEY_PATH
            ),
            CommandError::Config(e) => write!(f, "{}", e),
            CommandError::Api(ApiError::Status { status, body }) => {
                write!(f, "API request failed with status {}\n{}", status, body)
            }
            CommandError::Api(e) => write!(f, "{}", e),
            CommandError::NotFound(what) => write!(f, "{} not found", what),
            CommandError::Usage(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Config(e) => Some(e),
            CommandError::Api(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CommandError {
    fn from(e: ConfigError) -> Self {
        CommandError::Config(e)
    }
}

impl From<ApiError> for CommandError {
    fn from(e: ApiError) -> Self {
        CommandError::Api(e)
    }
}

/// Resolve configuration from `config_path` and the process environment.
pub fn load_config(config_path: &Path) -> Result<AscConfig, CommandError> {
    Ok(AscConfig::resolve(config_path, process_env)?)
}

/// Build a live client, failing before any request if credentials are missing.
pub fn connect(config: &AscConfig, config_path: &Path) -> Result<AppStoreClient, CommandError> {
    let missing = config.missing_credentials();
    if !missing.is_empty() {
        return Err(CommandError::MissingCredentials {
            fields: missing,
            config_path: config_path.to_path_buf(),
        });
    }
    let credential = config.credential()?;
    Ok(AppStoreClient::connect(&credential)?)
}

/// Print selected attributes of each resource, separated by `---`.
pub(crate) fn print_resources(resources: &[Resource], fields: &[(&str, &str)]) {
    for resource in resources {
        for (label, key) in fields {
            if *key == "id" {
                println!("{}: {}", label, resource.id);
            } else {
                println!("{}: {}", label, resource.attribute_text(key));
            }
        }
        println!("---");
    }
}
