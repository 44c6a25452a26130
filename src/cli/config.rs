//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "defaults.search_limit")
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
///
/// Works on the file alone so keys from the environment are never written back.
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        println!("{}", Config::config_path()?.display());
        return Ok(());
    }

    if args.reset {
        Config::default().save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load_file()?;

    match (args.key, args.value) {
        (None, None) => show_all_config(&config),

        (Some(key), None) => {
            let value = config.get(&key).ok_or_else(|| {
                Error::Config(format!(
                    "Unknown config key: {}\n\nAvailable keys:\n  {}",
                    key,
                    Config::available_keys().join("\n  ")
                ))
            })?;
            println!("{}", value);
        }

        (Some(key), Some(value)) => {
            config.set(&key, &value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        (None, Some(_)) => {
            return Err(Error::Config("Must specify a key to set a value".to_string()));
        }
    }

    Ok(())
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    println!("[defaults]");
    println!("fallback_location = \"{}\"", config.defaults.fallback_location);
    println!("reverse_geocode_timeout_secs = {}", config.defaults.reverse_geocode_timeout_secs);
    println!("search_limit = {}", config.defaults.search_limit);
    println!("nearby_radius_m = {}", config.defaults.nearby_radius_m);
    println!("nearby_limit = {}", config.defaults.nearby_limit);
    println!("format = \"{}\"", config.defaults.format);
    println!();

    println!("[server]");
    println!("host = \"{}\"", config.server.host);
    println!("port = {}", config.server.port);
    println!();

    println!("[endpoints]");
    println!("nominatim = \"{}\"", config.endpoints.nominatim);
    println!("reverse_geocode = \"{}\"", config.endpoints.reverse_geocode);
    println!("directions = \"{}\"", config.endpoints.directions);
    println!("weather = \"{}\"", config.endpoints.weather);
    println!("wiki_rest = \"{}\"", config.endpoints.wiki_rest);
    println!("wiki_api = \"{}\"", config.endpoints.wiki_api);
    println!();

    println!("[url]");
    println!("default = \"{}\"", config.url.default);
    println!("directions = \"{}\"", config.url.directions);
    println!();

    println!("[url.providers]");
    let mut providers: Vec<_> = config.url.providers.iter().collect();
    providers.sort();
    for (name, template) in providers {
        println!("{} = \"{}\"", name, template);
    }
    println!();

    println!("[api_keys]");
    for (name, key) in [
        ("directions", &config.api_keys.directions),
        ("weather", &config.api_keys.weather),
        ("reverse_geocode", &config.api_keys.reverse_geocode),
    ] {
        println!("{}", masked_key(name, key));
    }
}

fn masked_key(name: &str, key: &str) -> String {
    if key.is_empty() {
        format!("{} = \"\" # not configured", name)
    } else {
        format!("{} = \"***\" # configured", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_masked() {
        assert_eq!(masked_key("weather", ""), "weather = \"\" # not configured");
        assert_eq!(masked_key("weather", "abc123"), "weather = \"***\" # configured");
    }
}
