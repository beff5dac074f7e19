//! Container configuration loaded from YAML.
//!
//! ```yaml
//! profiles: [prod, metrics]
//! eager_init: true
//! validate: true
//! properties:
//!   server:
//!     port: 8080
//! ```

use crate::profile::ActiveProfiles;
use crate::properties::MapProperties;

use serde::Deserialize;
use serde_yaml::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Failed to read configuration file: {0}")]
  Read(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  Parse(String),
}

/// Build-time settings for a container.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerConfig {
  /// Names of the active profiles.
  pub profiles: Vec<String>,
  /// A YAML tree flattened into dotted property names.
  pub properties: Value,
  /// Initialize every singleton while building the container.
  pub eager_init: bool,
  /// Run the static graph check while building the container.
  pub validate: bool,
}

impl ContainerConfig {
  pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
    serde_yaml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
  }

  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let file = File::open(path)?;
    serde_yaml::from_reader(BufReader::new(file)).map_err(|e| ConfigError::Parse(e.to_string()))
  }

  pub fn active_profiles(&self) -> ActiveProfiles {
    ActiveProfiles::new(self.profiles.iter().cloned())
  }

  pub fn property_map(&self) -> MapProperties {
    MapProperties::from_yaml(&self.properties)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::properties::PropertyResolver;
  use std::io::Write;

  #[test]
  fn empty_document_gives_defaults() {
    let config = ContainerConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, ContainerConfig::default());
    assert!(config.active_profiles().is_empty());
    assert!(config.property_map().is_empty());
  }

  #[test]
  fn parses_all_fields() {
    let config = ContainerConfig::from_yaml_str(
      r#"
profiles: [prod, metrics]
eager_init: true
validate: true
properties:
  server:
    port: 8080
"#,
    )
    .unwrap();

    assert!(config.eager_init);
    assert!(config.validate);
    assert!(config.active_profiles().contains("metrics"));
    assert_eq!(config.property_map().resolve("server.port").as_deref(), Some("8080"));
  }

  #[test]
  fn unknown_fields_are_rejected() {
    let err = ContainerConfig::from_yaml_str("profile: [typo]").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
  }

  #[test]
  fn loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "profiles: [dev]").unwrap();

    let config = ContainerConfig::from_file(file.path()).unwrap();
    assert_eq!(config.profiles, vec!["dev"]);

    let missing = ContainerConfig::from_file(Path::new("/definitely/not/here.yaml")).unwrap_err();
    assert!(matches!(missing, ConfigError::Read(_)));
  }
}
