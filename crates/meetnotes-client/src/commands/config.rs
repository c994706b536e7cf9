//! Configuration commands.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", ClientConfig::default_path().display());
    println!("{}", toml_str);
    println!("# token: {}", config.token_path().display());
    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.validate()?;
    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> ClientResult<()> {
    println!("config: {}", ClientConfig::default_path().display());
    Ok(())
}
