use fibre_elements::{
  BoxError, ConfigError, Container, ContainerConfig, Declaration, ElementError, ElementState, Parameter,
  PropertyResolver,
};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// --- Test Fixtures ---

#[derive(Debug, PartialEq)]
struct ServerSettings {
  host: String,
  port: u16,
  tls: bool,
}

fn server_settings() -> Declaration {
  Declaration::builder::<ServerSettings>()
    .parameter(Parameter::property::<String>("server.host"))
    .parameter(Parameter::property::<u16>("server.port"))
    .parameter(Parameter::property_or::<bool>("server.tls", "false"))
    .constructor(|args| {
      Ok::<_, ElementError>(ServerSettings {
        host: args.value(0)?,
        port: args.value(1)?,
        tls: args.value(2)?,
      })
    })
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  file.write_all(contents.as_bytes()).unwrap();
  file
}

// --- Configuration Tests ---

#[test]
fn test_container_from_config_file() {
  // Arrange
  let file = write_config(
    r#"
profiles: [prod]
properties:
  server:
    host: api.example.org
    port: 8443
    tls: true
"#,
  );
  let config = ContainerConfig::from_file(file.path()).unwrap();

  // Act
  let container = Container::builder()
    .with_config(&config)
    .declare(server_settings())
    .build()
    .unwrap();

  // Assert
  assert_eq!(
    *container.get::<ServerSettings>().unwrap(),
    ServerSettings {
      host: "api.example.org".to_string(),
      port: 8443,
      tls: true,
    }
  );
  assert!(container.active_profiles().contains("prod"));
  assert_eq!(container.properties().resolve("server.port").as_deref(), Some("8443"));
}

#[test]
fn test_eager_init_from_config() {
  // Arrange
  let built = Arc::new(AtomicUsize::new(0));
  let built_in = built.clone();
  let config = ContainerConfig::from_yaml_str("eager_init: true").unwrap();

  // Act
  let container = Container::builder()
    .with_config(&config)
    .declare(Declaration::builder::<u8>().name("early").constructor(move |_| {
      built_in.fetch_add(1, Ordering::SeqCst);
      Ok::<_, BoxError>(0)
    }))
    .build()
    .unwrap();

  // Assert
  assert_eq!(built.load(Ordering::SeqCst), 1);
  assert_eq!(container.context("early").unwrap().state(), ElementState::Initialized);
}

#[test]
fn test_eager_init_surfaces_missing_properties_at_build() {
  // Arrange
  let config = ContainerConfig::from_yaml_str(
    r#"
eager_init: true
properties:
  server:
    host: localhost
"#,
  )
  .unwrap();

  // Act
  let result = Container::builder().with_config(&config).declare(server_settings()).build();

  // Assert
  match result {
    Err(ElementError::PropertyNotFound { property, .. }) => assert_eq!(property, "server.port"),
    Err(other) => panic!("expected a missing property, got {other}"),
    Ok(_) => panic!("expected the eager build to fail"),
  }
}

#[test]
fn test_validate_flag_from_config() {
  // Arrange
  let config = ContainerConfig::from_yaml_str("validate: true").unwrap();

  // Act
  let result = Container::builder()
    .with_config(&config)
    .declare(
      Declaration::builder::<u8>()
        .name("orphan")
        .parameter(Parameter::named::<u16>("nowhere"))
        .constructor(|_| Ok::<_, BoxError>(0)),
    )
    .build();

  // Assert
  assert!(matches!(result, Err(ElementError::Validation { ref problems }) if problems.len() == 1));
}

#[test]
fn test_invalid_config_is_rejected() {
  // Act
  let unknown = ContainerConfig::from_yaml_str("eager: true").unwrap_err();
  let malformed = ContainerConfig::from_yaml_str("profiles: 12").unwrap_err();

  // Assert
  assert!(matches!(unknown, ConfigError::Parse(_)));
  assert!(matches!(malformed, ConfigError::Parse(_)));
}
