use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::preview::bootstrap::DeployFlavor;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

const CONFIG_FILE: &str = ".manage-preview.toml";

/// Top-level configuration loaded from .manage-preview.toml.
///
/// All fields have defaults, so the tool works with zero config. The CLI
/// `--region` flag, when given, overrides `provider.region`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Cloud provider settings (region, zone, image, size)
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Provisioning loop settings (timeout, poll interval, ports)
    #[serde(default)]
    pub provision: ProvisionConfig,

    /// Deployment settings (bootstrap flavor, health probe limits)
    #[serde(default)]
    pub deploy: DeployConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// AWS region the instance lives in
    pub region: String,
    /// Availability zone suffix appended to the region (e.g., "a")
    pub availability_zone: String,
    /// Lightsail OS image
    pub blueprint_id: String,
    /// Lightsail instance size
    pub bundle_id: String,
}

impl ProviderConfig {
    /// Full availability zone, e.g. "us-east-1a".
    pub fn zone(&self) -> String {
        format!("{}{}", self.region, self.availability_zone)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            region: "us-east-1".to_string(),
            availability_zone: "a".to_string(),
            blueprint_id: "ubuntu_22_04".to_string(),
            bundle_id: "nano_3_0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvisionConfig {
    /// How long to wait for the instance to report running with an address
    pub ready_timeout_secs: u64,
    /// Fixed delay between status queries
    pub poll_interval_secs: u64,
    /// Inbound TCP ports opened on the instance firewall
    pub open_ports: Vec<u16>,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        ProvisionConfig {
            ready_timeout_secs: 300,
            poll_interval_secs: 10,
            // ssh, http, https, node dev server, python dev server
            open_ports: vec![22, 80, 443, 3000, 5000],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Bootstrap script flavor: "application" or "static"
    pub flavor: DeployFlavor,
    /// How long to wait for the deployed preview to answer HTTP
    pub health_timeout_secs: u64,
    /// Fixed delay between health probes
    pub health_interval_secs: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        DeployConfig {
            flavor: DeployFlavor::Application,
            health_timeout_secs: 300,
            health_interval_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from .manage-preview.toml in the current
    /// directory, falling back to defaults if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider.region, "us-east-1");
        assert_eq!(config.provider.zone(), "us-east-1a");
        assert_eq!(config.provider.blueprint_id, "ubuntu_22_04");
        assert_eq!(config.provision.ready_timeout_secs, 300);
        assert_eq!(config.provision.open_ports, vec![22, 80, 443, 3000, 5000]);
        assert_eq!(config.deploy.flavor, DeployFlavor::Application);
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[provider]
region = "eu-west-1"
bundle_id = "small_3_0"

[provision]
ready_timeout_secs = 120
open_ports = [80, 443]

[deploy]
flavor = "static"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider.region, "eu-west-1");
        assert_eq!(config.provider.zone(), "eu-west-1a");
        assert_eq!(config.provider.bundle_id, "small_3_0");
        assert_eq!(config.provision.ready_timeout_secs, 120);
        // Unset fields keep their defaults.
        assert_eq!(config.provision.poll_interval_secs, 10);
        assert_eq!(config.provision.open_ports, vec![80, 443]);
        assert_eq!(config.deploy.flavor, DeployFlavor::Static);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.provider.region, "us-east-1");
        assert_eq!(config.deploy.health_timeout_secs, 300);
    }
}
