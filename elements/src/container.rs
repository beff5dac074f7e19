//! The `Container`, its builder and the container-wide lookup API.

use crate::config::ContainerConfig;
use crate::context::ElementContext;
use crate::declaration::Declaration;
use crate::element::{Element, ElementType, Scope};
use crate::error::{ElementError, Result};
use crate::path::ResolutionPath;
use crate::profile::ActiveProfiles;
use crate::properties::{MapProperties, PropertyResolver};
use crate::registry::Registry;
use crate::resolver::Resolver;
use crate::validate;

use std::any::{type_name, Any};
use std::sync::Arc;
use tracing::{debug, info};

/// Name of the pre-built element holding the [`ActiveProfiles`].
pub const ACTIVE_PROFILES: &str = "activeProfiles";
/// Name of the pre-built element holding the `dyn PropertyResolver`.
pub const PROPERTIES: &str = "properties";

/// The Inversion of Control (IoC) container.
///
/// Holds one [`ElementContext`] per active declaration and builds elements on
/// request. The set of elements is fixed when the container is built; only
/// their lifecycle state changes afterwards. The container is `Send + Sync`
/// and can be shared between threads, e.g. behind an `Arc`.
pub struct Container {
  registry: Registry,
  properties: Arc<dyn PropertyResolver>,
  profiles: ActiveProfiles,
}

impl Container {
  pub fn builder() -> ContainerBuilder {
    ContainerBuilder::new()
  }

  fn resolver(&self) -> Resolver<'_> {
    Resolver::new(&self.registry, self.properties.as_ref())
  }

  // --- Resolution ---

  /// Returns the element called `name`, constructing it if needed.
  pub fn get_element(&self, name: &str) -> Result<Element> {
    let context = self.registry.by_name(name)?;
    self.resolver().resolve(context, &mut ResolutionPath::new())
  }

  /// Returns the single active element declared with type `ty`.
  pub fn get_element_by_type(&self, ty: ElementType) -> Result<Element> {
    let context = self.registry.by_type(ty)?;
    self.resolver().resolve(context, &mut ResolutionPath::new())
  }

  /// Resolves the single active element of type `T`.
  pub fn get<T: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<T>> {
    let context = self.registry.by_type(ElementType::of::<T>())?;
    let element = self.resolver().resolve(context, &mut ResolutionPath::new())?;
    typed(context.name(), &element)
  }

  /// Resolves the element called `name` as a `T`.
  pub fn get_named<T: ?Sized + Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    let element = self.get_element(name)?;
    typed(name, &element)
  }

  /// Resolves every active element of type `T`, in declaration order.
  pub fn get_all<T: ?Sized + Any + Send + Sync>(&self) -> Result<Vec<Arc<T>>> {
    let resolver = self.resolver();
    self
      .registry
      .all_of_type(ElementType::of::<T>())
      .map(|context| {
        let element = resolver.resolve(context, &mut ResolutionPath::new())?;
        typed(context.name(), &element)
      })
      .collect()
  }

  /// Initializes the element called `name` without returning it.
  ///
  /// Supplied elements fail with `AlreadyInitialized`.
  pub fn initialize(&self, name: &str) -> Result<()> {
    let context = self.registry.by_name(name)?;
    self.resolver().initialize(context, &mut ResolutionPath::new())
  }

  /// Initializes every constructed singleton in declaration order, stopping
  /// at the first failure. Returns how many were warmed; supplied elements
  /// are not counted.
  pub fn prewarm(&self) -> Result<usize> {
    let resolver = self.resolver();
    let mut warmed = 0;
    for context in self.registry.contexts() {
      // Supplied elements are ready from the start and refuse initialization.
      if context.scope() == Scope::Singleton && !context.declaration().is_supplied() {
        resolver.initialize(context, &mut ResolutionPath::new())?;
        warmed += 1;
      }
    }
    info!(singletons = warmed, "Container prewarmed");
    Ok(warmed)
  }

  /// Checks the dependency graph for unsatisfiable dependencies and cycles
  /// without constructing anything.
  pub fn validate(&self) -> Result<()> {
    validate::check(&self.registry)
  }

  // --- Introspection ---

  /// Every active context, in declaration order. The pre-built core
  /// elements come first.
  pub fn all(&self) -> &[ElementContext] {
    self.registry.contexts()
  }

  pub fn context(&self, name: &str) -> Option<&ElementContext> {
    self.registry.get(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.registry.get(name).is_some()
  }

  pub fn len(&self) -> usize {
    self.registry.contexts().len()
  }

  pub fn is_empty(&self) -> bool {
    self.registry.contexts().is_empty()
  }

  pub fn active_profiles(&self) -> &ActiveProfiles {
    &self.profiles
  }

  pub fn properties(&self) -> &dyn PropertyResolver {
    self.properties.as_ref()
  }
}

fn typed<T: ?Sized + Any + Send + Sync>(name: &str, element: &Element) -> Result<Arc<T>> {
  element.downcast::<T>().ok_or_else(|| ElementError::TypeMismatch {
    element: name.to_owned(),
    expected: type_name::<T>(),
    actual: element.type_name(),
  })
}

/// Collects declarations, profiles and properties, then builds a
/// [`Container`] in one step.
#[must_use]
pub struct ContainerBuilder {
  declarations: Vec<Declaration>,
  profiles: ActiveProfiles,
  properties: Option<Arc<dyn PropertyResolver>>,
  eager: bool,
  validate: bool,
}

impl Default for ContainerBuilder {
  fn default() -> Self {
    Self::new()
  }
}

impl ContainerBuilder {
  pub fn new() -> Self {
    Self {
      declarations: Vec::new(),
      profiles: ActiveProfiles::default(),
      properties: None,
      eager: false,
      validate: false,
    }
  }

  pub fn declare(mut self, declaration: Declaration) -> Self {
    self.declarations.push(declaration);
    self
  }

  pub fn declare_all(mut self, declarations: impl IntoIterator<Item = Declaration>) -> Self {
    self.declarations.extend(declarations);
    self
  }

  pub fn profiles<I, S>(mut self, names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.profiles = ActiveProfiles::new(names);
    self
  }

  pub fn properties(self, properties: impl PropertyResolver + 'static) -> Self {
    self.shared_properties(Arc::new(properties))
  }

  pub fn shared_properties(mut self, properties: Arc<dyn PropertyResolver>) -> Self {
    self.properties = Some(properties);
    self
  }

  /// Initialize every singleton during `build`, so that broken elements
  /// fail the build instead of the first request.
  pub fn eager(mut self, eager: bool) -> Self {
    self.eager = eager;
    self
  }

  /// Run [`Container::validate`] during `build`.
  pub fn validate(mut self, validate: bool) -> Self {
    self.validate = validate;
    self
  }

  /// Applies profiles, properties and build flags from `config`.
  pub fn with_config(self, config: &ContainerConfig) -> Self {
    self
      .profiles(config.profiles.iter().cloned())
      .properties(config.property_map())
      .eager(config.eager_init)
      .validate(config.validate)
  }

  pub fn build(self) -> Result<Container> {
    let properties = self
      .properties
      .unwrap_or_else(|| Arc::new(MapProperties::new()));
    let core = [
      Declaration::builder::<ActiveProfiles>()
        .name(ACTIVE_PROFILES)
        .supplied(self.profiles.clone()),
      Declaration::builder::<dyn PropertyResolver>()
        .name(PROPERTIES)
        .supplied_shared(properties.clone()),
    ];
    let declared = self.declarations.len();
    let registry = Registry::register_all(core.into_iter().chain(self.declarations), &self.profiles)?;

    let container = Container {
      registry,
      properties,
      profiles: self.profiles,
    };
    info!(
      elements = container.len(),
      excluded = declared + 2 - container.len(),
      profiles = %container.profiles,
      "Container built"
    );

    if self.validate {
      container.validate()?;
      debug!("Dependency graph validated");
    }
    if self.eager {
      container.prewarm()?;
    }
    Ok(container)
  }
}
