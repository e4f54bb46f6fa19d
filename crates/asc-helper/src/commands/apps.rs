use asc_core::{AppStoreClient, AscConfig, NewApp, Platform};
use serde_json::{Map, Value};

use super::{print_resources, CommandError};

const APP_FIELDS: &[(&str, &str)] = &[
    ("ID", "id"),
    ("Name", "name"),
    ("Bundle ID", "bundleId"),
    ("Platform", "platform"),
];

pub fn list(client: &mut AppStoreClient) -> Result<(), CommandError> {
    println!("Fetching apps...");
    let apps = client.list_apps()?;
    println!("Found {} app(s)", apps.len());
    print_resources(&apps, APP_FIELDS);
    Ok(())
}

/// Print the full app record for `bundle_id` as JSON.
pub fn info(client: &mut AppStoreClient, bundle_id: &str) -> Result<(), CommandError> {
    println!("Fetching app info for {}...", bundle_id);
    let app = client
        .app_by_bundle_id(bundle_id)?
        .ok_or_else(|| CommandError::NotFound(format!("app with bundle ID {}", bundle_id)))?;

    let pretty = serde_json::to_string_pretty(&app)
        .map_err(|e| CommandError::Usage(format!("failed to format app record: {}", e)))?;
    println!("{}", pretty);
    Ok(())
}

/// Register the app named in the config.
pub fn create(
    client: &mut AppStoreClient,
    config: &AscConfig,
    platform: Platform,
    locale: &str,
) -> Result<(), CommandError> {
    let app = NewApp {
        bundle_id: config.bundle_id().to_string(),
        name: config.app_name().to_string(),
        platform,
        primary_locale: locale.to_string(),
    };

    println!("Creating app: {} ({})", app.name, app.bundle_id);
    let created = client.create_app(&app)?;
    println!("App created successfully!");
    println!("App ID: {}", created.id);
    Ok(())
}

/// Patch app attributes given as `key=value` pairs.
pub fn update(
    client: &mut AppStoreClient,
    app_id: &str,
    attributes: &[(String, Value)],
) -> Result<(), CommandError> {
    let attributes: Map<String, Value> = attributes.iter().cloned().collect();
    let keys: Vec<&str> = attributes.keys().map(String::as_str).collect();

    println!("Updating app {} ({})...", app_id, keys.join(", "));
    let updated = client.update_app(app_id, &attributes)?;
    println!("App updated successfully!");
    print_resources(std::slice::from_ref(&updated), APP_FIELDS);
    Ok(())
}
