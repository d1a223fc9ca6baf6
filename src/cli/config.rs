//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;
use std::path::Path;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "search.radius_miles")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    let path = Config::config_path()?;
    let output = execute(&args, &path)?;
    println!("{}", output);
    Ok(())
}

/// Apply the command to the config file at `path`, returning what to print
fn execute(args: &ConfigArgs, path: &Path) -> Result<String> {
    if args.path {
        return Ok(path.display().to_string());
    }

    if args.reset {
        Config::default().save_to(path)?;
        return Ok("Configuration reset to defaults".to_string());
    }

    let mut config = Config::load_from(path)?;

    match (args.key.as_deref(), args.value.as_deref()) {
        (None, None) => Ok(render_config(&config)),
        (Some(key), None) => config.get(key).ok_or_else(|| unknown_key(key)),
        (Some(key), Some(value)) => {
            if config.get(key).is_none() {
                return Err(unknown_key(key));
            }
            config.set(key, value)?;
            config.save_to(path)?;
            Ok(format!("{} = {}", key, value))
        }
        (None, Some(_)) => Err(Error::Config(
            "Must specify a key to set a value".to_string(),
        )),
    }
}

fn unknown_key(key: &str) -> Error {
    Error::Config(format!(
        "Unknown config key: {}. Available keys: {}",
        key,
        Config::available_keys().join(", ")
    ))
}

/// Render all configuration values as TOML-like text
fn render_config(config: &Config) -> String {
    let geo = &config.geocoding;
    let lines = [
        "[database]".to_string(),
        format!("url = \"{}\"", config.database.url),
        String::new(),
        "[server]".to_string(),
        format!("host = \"{}\"", config.server.host),
        format!("port = {}", config.server.port),
        String::new(),
        "[search]".to_string(),
        format!("radius_miles = {}", config.search.radius_miles),
        format!("per_page = {}", config.search.per_page),
        String::new(),
        "[geocoding]".to_string(),
        format!("user_agent = \"{}\"", geo.user_agent),
        format!("zip_url = \"{}\"", geo.zip_url),
        format!("nominatim_url = \"{}\"", geo.nominatim_url),
        format!("zip_timeout_secs = {}", geo.zip_timeout_secs),
        format!("address_timeout_secs = {}", geo.address_timeout_secs),
        format!("zip_delay_ms = {}", geo.zip_delay_ms),
        format!("address_delay_ms = {}", geo.address_delay_ms),
        format!("progress_every = {}", geo.progress_every),
    ];
    lines.join("\n")
}
