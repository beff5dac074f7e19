use fibre_elements::{BoxError, Container, ContainerConfig, Declaration, ElementError, Parameter};
use std::sync::Arc;

trait Storage: Send + Sync {
  fn describe(&self) -> String;
}

struct DiskStorage {
  root: String,
}
impl Storage for DiskStorage {
  fn describe(&self) -> String {
    format!("disk storage at {}", self.root)
  }
}

struct MemoryStorage;
impl Storage for MemoryStorage {
  fn describe(&self) -> String {
    "in-memory storage".to_string()
  }
}

// The same declarations, activated differently per profile.
fn declarations() -> Vec<Declaration> {
  vec![
    Declaration::builder::<dyn Storage>()
      .name("storage")
      .requires_profile("prod")
      .parameter(Parameter::property_or::<String>("storage.root", "/var/lib/app"))
      .shared_constructor(|args| {
        let root = args.value::<String>(0)?;
        Ok::<_, ElementError>(Arc::new(DiskStorage { root }) as Arc<dyn Storage>)
      }),
    Declaration::builder::<dyn Storage>()
      .name("storage")
      .forbids_profile("prod")
      .shared_constructor(|_| Ok::<_, BoxError>(Arc::new(MemoryStorage) as Arc<dyn Storage>)),
  ]
}

fn run(label: &str, yaml: &str) -> Result<(), BoxError> {
  let config = ContainerConfig::from_yaml_str(yaml)?;
  let container = Container::builder()
    .with_config(&config)
    .declare_all(declarations())
    .build()?;

  let storage = container.get::<dyn Storage>()?;
  println!("{}: {} (profiles {})", label, storage.describe(), container.active_profiles());
  Ok(())
}

fn main() -> Result<(), BoxError> {
  run("development", "profiles: [dev]")?;
  run(
    "production",
    r#"
profiles: [prod]
eager_init: true
properties:
  storage:
    root: /srv/data
"#,
  )?;
  Ok(())
}
