use std::path::Path;

use asc_core::AscConfig;

use super::CommandError;

/// Write a config template with placeholder credentials.
pub fn run(config_path: &Path) -> Result<(), CommandError> {
    AscConfig::write_template(config_path)?;

    println!("Created {} template", config_path.display());
    println!("Please edit it with your App Store Connect API credentials");
    println!();
    println!("To get API credentials:");
    println!("1. Go to https://appstoreconnect.apple.com/access/api");
    println!("2. Generate an API key with the App Manager role");
    println!("3. Download the .p8 private key file");
    println!("4. Copy the Key ID and Issuer ID into the config file");
    Ok(())
}
