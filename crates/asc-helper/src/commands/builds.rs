use asc_core::{AppStoreClient, NewVersion, Platform};

use super::{print_resources, CommandError};

const BUILD_FIELDS: &[(&str, &str)] = &[
    ("Version", "version"),
    ("Build", "buildNumber"),
    ("State", "processingState"),
];

pub fn list(client: &mut AppStoreClient, app_id: &str) -> Result<(), CommandError> {
    println!("Fetching builds for app {}...", app_id);
    let builds = client.list_builds(app_id)?;
    if builds.is_empty() {
        println!("No builds found");
        return Ok(());
    }
    print_resources(&builds, BUILD_FIELDS);
    Ok(())
}

/// Open a new store version on `app_id`.
pub fn create_version(
    client: &mut AppStoreClient,
    app_id: &str,
    platform: Platform,
    version_string: &str,
) -> Result<(), CommandError> {
    let version = NewVersion {
        app_id: app_id.to_string(),
        platform,
        version_string: version_string.to_string(),
    };

    println!("Creating version {} for app {}...", version_string, app_id);
    let created = client.create_version(&version)?;
    println!("Version created successfully!");
    println!("Version ID: {}", created.id);
    Ok(())
}
