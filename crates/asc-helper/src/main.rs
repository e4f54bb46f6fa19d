mod commands;

use std::path::PathBuf;
use std::process;

use asc_core::config::CONFIG_FILENAME;
use asc_core::resources::{parse_attribute, DEFAULT_LOCALE, DEFAULT_VERSION_STRING};
use asc_core::Platform;
use clap::{Args, CommandFactory, Parser};
use serde_json::Value;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "asc-helper")]
#[command(about = "MouseCross App Store Connect API helper")]
struct Cli {
    #[command(flatten)]
    action: ActionFlags,

    /// Config file with API credentials
    #[arg(long, default_value = CONFIG_FILENAME)]
    config: PathBuf,

    /// Platform for --create-app and --create-version
    #[arg(long, default_value_t = Platform::MacOs)]
    platform: Platform,

    /// Version string for --create-version
    #[arg(long, default_value = DEFAULT_VERSION_STRING)]
    version_string: String,

    /// Primary locale for --create-app
    #[arg(long, default_value = DEFAULT_LOCALE)]
    locale: String,

    /// Attribute for --update-app (repeatable; values that parse as JSON keep their type)
    #[arg(long = "attribute", value_name = "KEY=VALUE", value_parser = parse_attribute)]
    attributes: Vec<(String, Value)>,
}

/// Exactly one of these may be given.
#[derive(Args)]
#[group(multiple = false)]
struct ActionFlags {
    /// Create a configuration template
    #[arg(long)]
    setup: bool,

    /// List all apps
    #[arg(long)]
    list_apps: bool,

    /// Show the app record for a bundle ID
    #[arg(long, value_name = "BUNDLE_ID")]
    app_info: Option<String>,

    /// Register the app named in the config
    #[arg(long)]
    create_app: bool,

    /// List builds for an app
    #[arg(long, value_name = "APP_ID")]
    list_builds: Option<String>,

    /// Create a new store version for an app
    #[arg(long, value_name = "APP_ID")]
    create_version: Option<String>,

    /// Update app attributes (see --attribute)
    #[arg(long, value_name = "APP_ID")]
    update_app: Option<String>,
}

enum Action {
    Setup,
    Api(ApiAction),
}

/// Actions that talk to the API and therefore need credentials.
enum ApiAction {
    ListApps,
    AppInfo(String),
    CreateApp,
    ListBuilds(String),
    CreateVersion(String),
    UpdateApp(String),
}

impl ActionFlags {
    fn into_action(self) -> Option<Action> {
        if self.setup {
            return Some(Action::Setup);
        }
        let api = if self.list_apps {
            ApiAction::ListApps
        } else if self.create_app {
            ApiAction::CreateApp
        } else if let Some(bundle_id) = self.app_info {
            ApiAction::AppInfo(bundle_id)
        } else if let Some(app_id) = self.list_builds {
            ApiAction::ListBuilds(app_id)
        } else if let Some(app_id) = self.create_version {
            ApiAction::CreateVersion(app_id)
        } else if let Some(app_id) = self.update_app {
            ApiAction::UpdateApp(app_id)
        } else {
            return None;
        };
        Some(Action::Api(api))
    }
}

/// Modifiers shared by the API actions.
struct Options {
    config: PathBuf,
    platform: Platform,
    version_string: String,
    locale: String,
    attributes: Vec<(String, Value)>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let Cli {
        action,
        config,
        platform,
        version_string,
        locale,
        attributes,
    } = Cli::parse();

    let Some(action) = action.into_action() else {
        if let Err(e) = Cli::command().print_help() {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
        return;
    };

    let options = Options {
        config,
        platform,
        version_string,
        locale,
        attributes,
    };

    let result = match action {
        Action::Setup => commands::setup::run(&options.config),
        Action::Api(api) => run_api(api, &options),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_api(action: ApiAction, options: &Options) -> Result<(), CommandError> {
    if matches!(action, ApiAction::UpdateApp(_)) && options.attributes.is_empty() {
        return Err(CommandError::Usage(
            "--update-app needs at least one --attribute KEY=VALUE".to_string(),
        ));
    }

    let config = commands::load_config(&options.config)?;
    let mut client = commands::connect(&config, &options.config)?;
    log::debug!("client ready: {:?}", client);

    match action {
        ApiAction::ListApps => commands::apps::list(&mut client),
        ApiAction::AppInfo(bundle_id) => commands::apps::info(&mut client, &bundle_id),
        ApiAction::CreateApp => {
            commands::apps::create(&mut client, &config, options.platform, &options.locale)
        }
        ApiAction::ListBuilds(app_id) => commands::builds::list(&mut client, &app_id),
        ApiAction::CreateVersion(app_id) => commands::builds::create_version(
            &mut client,
            &app_id,
            options.platform,
            &options.version_string,
        ),
        ApiAction::UpdateApp(app_id) => {
            commands::apps::update(&mut client, &app_id, &options.attributes)
        }
    }
}
