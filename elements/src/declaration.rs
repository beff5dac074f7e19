//! Immutable declaration records and the typed builder that produces them.
//!
//! A declaration describes how to build one element: its name, the type it
//! satisfies, its scope, where it comes from (a constructor, a factory method
//! on another element, or a pre-built instance), the ordered parameters that
//! must be resolved first, the profiles gating it and the post-initialization
//! hooks to run on every fresh instance.

use crate::element::{Element, ElementType, Scope};
use crate::error::{into_cause, BoxError, Cause, ElementError, Result};
use crate::resolver::Arguments;

use std::any::{type_name, Any};
use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

pub(crate) type ConstructFn = Arc<dyn Fn(&Arguments) -> Result<Element, Cause> + Send + Sync>;
type ConvertFn = Arc<dyn Fn(&str) -> Result<Element, Cause> + Send + Sync>;
type HookFn = Arc<dyn Fn(&Element) -> Result<(), Cause> + Send + Sync>;

/// A dependency on another element, looked up by name when a hint is given
/// and by type otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementParameter {
  pub(crate) target: ElementType,
  pub(crate) name: Option<String>,
  pub(crate) optional: bool,
}

impl ElementParameter {
  pub fn target(&self) -> ElementType {
    self.target
  }

  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }

  pub fn is_optional(&self) -> bool {
    self.optional
  }
}

impl fmt::Display for ElementParameter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.name {
      Some(name) => write!(f, "'{}' ({})", name, self.target),
      None => write!(f, "{}", self.target),
    }
  }
}

/// A value taken from the property source and parsed into its target type.
#[derive(Clone)]
pub struct PropertyParameter {
  pub(crate) name: String,
  pub(crate) target: &'static str,
  pub(crate) default: Option<String>,
  convert: ConvertFn,
}

impl PropertyParameter {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn target(&self) -> &'static str {
    self.target
  }

  pub fn default_value(&self) -> Option<&str> {
    self.default.as_deref()
  }

  pub(crate) fn convert(&self, raw: &str) -> Result<Element, Cause> {
    (self.convert)(raw)
  }
}

impl fmt::Debug for PropertyParameter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PropertyParameter")
      .field("name", &self.name)
      .field("target", &self.target)
      .field("default", &self.default)
      .finish()
  }
}

/// One entry of a construction site's parameter list.
#[derive(Debug, Clone)]
pub enum Parameter {
  Element(ElementParameter),
  Property(PropertyParameter),
}

impl Parameter {
  /// A required dependency on the single active element of type `T`.
  pub fn element<T: ?Sized + Any>() -> Self {
    Parameter::Element(ElementParameter {
      target: ElementType::of::<T>(),
      name: None,
      optional: false,
    })
  }

  /// A required dependency on the element called `name`, expected to be a `T`.
  pub fn named<T: ?Sized + Any>(name: impl Into<String>) -> Self {
    Parameter::Element(ElementParameter {
      target: ElementType::of::<T>(),
      name: Some(name.into()),
      optional: false,
    })
  }

  /// Like [`Parameter::element`], but resolves to nothing when no element of
  /// type `T` is active.
  pub fn optional<T: ?Sized + Any>() -> Self {
    Parameter::Element(ElementParameter {
      target: ElementType::of::<T>(),
      name: None,
      optional: true,
    })
  }

  pub fn optional_named<T: ?Sized + Any>(name: impl Into<String>) -> Self {
    Parameter::Element(ElementParameter {
      target: ElementType::of::<T>(),
      name: Some(name.into()),
      optional: true,
    })
  }

  /// The property `name`, parsed with `T::from_str`.
  pub fn property<T>(name: impl Into<String>) -> Self
  where
    T: FromStr + Any + Send + Sync,
    T::Err: Into<BoxError>,
  {
    Parameter::Property(PropertyParameter {
      name: name.into(),
      target: type_name::<T>(),
      default: None,
      convert: Arc::new(|raw: &str| {
        raw
          .trim()
          .parse::<T>()
          .map(Element::new)
          .map_err(into_cause)
      }),
    })
  }

  /// The property `name`, falling back to `default` when it is not set.
  pub fn property_or<T>(name: impl Into<String>, default: impl Into<String>) -> Self
  where
    T: FromStr + Any + Send + Sync,
    T::Err: Into<BoxError>,
  {
    match Self::property::<T>(name) {
      Parameter::Property(mut property) => {
        property.default = Some(default.into());
        Parameter::Property(property)
      }
      element => element,
    }
  }
}

/// A named no-argument lifecycle hook run after construction.
#[derive(Clone)]
pub struct Hook {
  name: String,
  run: HookFn,
}

impl Hook {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub(crate) fn run(&self, instance: &Element) -> Result<(), Cause> {
    (self.run)(instance)
  }
}

impl fmt::Debug for Hook {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Hook({})", self.name)
  }
}

/// Where an element's instances come from.
#[derive(Clone)]
pub enum ConstructionSite {
  /// A free-standing constructor taking the resolved parameters.
  Constructor {
    parameters: Vec<Parameter>,
    construct: ConstructFn,
  },
  /// A method on another element. The owner is resolved before the
  /// parameters and handed to the method as its receiver.
  FactoryMethod {
    owner: ElementParameter,
    method: String,
    parameters: Vec<Parameter>,
    construct: ConstructFn,
  },
  /// An instance built outside the container.
  Supplied(Element),
}

impl ConstructionSite {
  pub fn parameters(&self) -> &[Parameter] {
    match self {
      ConstructionSite::Constructor { parameters, .. }
      | ConstructionSite::FactoryMethod { parameters, .. } => parameters,
      ConstructionSite::Supplied(_) => &[],
    }
  }

  pub fn owner(&self) -> Option<&ElementParameter> {
    match self {
      ConstructionSite::FactoryMethod { owner, .. } => Some(owner),
      _ => None,
    }
  }

  pub(crate) fn invoke(&self, element: &str, args: &Arguments) -> Result<Element> {
    match self {
      ConstructionSite::Constructor { construct, .. }
      | ConstructionSite::FactoryMethod { construct, .. } => {
        construct(args).map_err(|cause| ElementError::Construction {
          element: element.to_owned(),
          cause,
        })
      }
      ConstructionSite::Supplied(_) => Err(ElementError::AlreadyInitialized {
        element: element.to_owned(),
      }),
    }
  }
}

impl fmt::Debug for ConstructionSite {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConstructionSite::Constructor { parameters, .. } => f
        .debug_struct("Constructor")
        .field("parameters", parameters)
        .finish_non_exhaustive(),
      ConstructionSite::FactoryMethod {
        owner,
        method,
        parameters,
        ..
      } => f
        .debug_struct("FactoryMethod")
        .field("owner", owner)
        .field("method", method)
        .field("parameters", parameters)
        .finish_non_exhaustive(),
      ConstructionSite::Supplied(element) => f.debug_tuple("Supplied").field(element).finish(),
    }
  }
}

/// The immutable description of one element.
#[derive(Debug, Clone)]
pub struct Declaration {
  name: String,
  declared_type: ElementType,
  scope: Scope,
  site: ConstructionSite,
  required_profiles: BTreeSet<String>,
  forbidden_profiles: BTreeSet<String>,
  post_init: Vec<Hook>,
}

impl Declaration {
  /// Starts a declaration for an element satisfying type `T`.
  pub fn builder<T: ?Sized + Any + Send + Sync>() -> DeclarationBuilder<T> {
    DeclarationBuilder {
      name: None,
      scope: Scope::Singleton,
      parameters: Vec::new(),
      required_profiles: BTreeSet::new(),
      forbidden_profiles: BTreeSet::new(),
      post_init: Vec::new(),
      _marker: PhantomData,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn declared_type(&self) -> ElementType {
    self.declared_type
  }

  pub fn scope(&self) -> Scope {
    self.scope
  }

  pub fn site(&self) -> &ConstructionSite {
    &self.site
  }

  pub fn parameters(&self) -> &[Parameter] {
    self.site.parameters()
  }

  pub fn required_profiles(&self) -> &BTreeSet<String> {
    &self.required_profiles
  }

  pub fn forbidden_profiles(&self) -> &BTreeSet<String> {
    &self.forbidden_profiles
  }

  pub fn post_init(&self) -> &[Hook] {
    &self.post_init
  }

  pub fn is_supplied(&self) -> bool {
    matches!(self.site, ConstructionSite::Supplied(_))
  }
}

/// Builds a [`Declaration`] for elements of type `T`.
///
/// The construction site is chosen last; each of `constructor`,
/// `shared_constructor`, `factory_method` and `supplied` finishes the
/// declaration.
#[must_use]
pub struct DeclarationBuilder<T: ?Sized> {
  name: Option<String>,
  scope: Scope,
  parameters: Vec<Parameter>,
  required_profiles: BTreeSet<String>,
  forbidden_profiles: BTreeSet<String>,
  post_init: Vec<Hook>,
  _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized + Any + Send + Sync> DeclarationBuilder<T> {
  /// Overrides the default name, which is the full type name of `T`.
  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn scope(mut self, scope: Scope) -> Self {
    self.scope = scope;
    self
  }

  pub fn prototype(self) -> Self {
    self.scope(Scope::Prototype)
  }

  pub fn parameter(mut self, parameter: Parameter) -> Self {
    self.parameters.push(parameter);
    self
  }

  pub fn parameters(mut self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
    self.parameters.extend(parameters);
    self
  }

  pub fn requires_profile(mut self, profile: impl Into<String>) -> Self {
    self.required_profiles.insert(profile.into());
    self
  }

  pub fn forbids_profile(mut self, profile: impl Into<String>) -> Self {
    self.forbidden_profiles.insert(profile.into());
    self
  }

  /// Adds a hook run on every fresh instance, after the ones added before it.
  ///
  /// Supplied instances are never fresh: finishing with `supplied` or
  /// `supplied_shared` discards the hooks with a warning.
  pub fn post_init<F, E>(mut self, name: impl Into<String>, hook: F) -> Self
  where
    F: Fn(&T) -> Result<(), E> + Send + Sync + 'static,
    E: Into<BoxError>,
  {
    let run: HookFn = Arc::new(move |element: &Element| {
      let target = element.downcast::<T>().ok_or_else(|| {
        into_cause(ElementError::TypeMismatch {
          element: element.type_name().to_owned(),
          expected: type_name::<T>(),
          actual: element.type_name(),
        })
      })?;
      hook(&*target).map_err(into_cause)
    });
    self.post_init.push(Hook {
      name: name.into(),
      run,
    });
    self
  }

  /// Finishes with a constructor returning a shared `T`, which may be a
  /// trait object.
  pub fn shared_constructor<F, E>(mut self, construct: F) -> Declaration
  where
    F: Fn(&Arguments) -> Result<Arc<T>, E> + Send + Sync + 'static,
    E: Into<BoxError>,
  {
    let construct: ConstructFn = Arc::new(move |args: &Arguments| {
      construct(args).map(Element::from_arc).map_err(into_cause)
    });
    let parameters = std::mem::take(&mut self.parameters);
    self.finish(ConstructionSite::Constructor {
      parameters,
      construct,
    })
  }

  /// Finishes with the pre-built, shared `instance`. Supplied elements are
  /// always singletons and never run hooks.
  pub fn supplied_shared(mut self, instance: Arc<T>) -> Declaration {
    self.scope = Scope::Singleton;
    if !self.post_init.is_empty() {
      warn!(
        element = self.name.as_deref().unwrap_or_else(|| type_name::<T>()),
        hooks = self.post_init.len(),
        "Post-init hooks are ignored for supplied elements"
      );
      self.post_init.clear();
    }
    self.finish(ConstructionSite::Supplied(Element::from_arc(instance)))
  }

  fn finish(self, site: ConstructionSite) -> Declaration {
    Declaration {
      name: self.name.unwrap_or_else(|| type_name::<T>().to_owned()),
      declared_type: ElementType::of::<T>(),
      scope: self.scope,
      site,
      required_profiles: self.required_profiles,
      forbidden_profiles: self.forbidden_profiles,
      post_init: self.post_init,
    }
  }
}

impl<T: Any + Send + Sync> DeclarationBuilder<T> {
  /// Finishes with a constructor taking the resolved parameters.
  pub fn constructor<F, E>(self, construct: F) -> Declaration
  where
    F: Fn(&Arguments) -> Result<T, E> + Send + Sync + 'static,
    E: Into<BoxError>,
  {
    self.shared_constructor(move |args: &Arguments| construct(args).map(Arc::new))
  }

  /// Finishes with `method` on the owner element of type `O`.
  ///
  /// The owner is looked up by `owner_name` when given and by type otherwise.
  pub fn factory_method<O, F, E>(mut self, owner_name: Option<&str>, method: &str, invoke: F) -> Declaration
  where
    O: ?Sized + Any + Send + Sync,
    F: Fn(&O, &Arguments) -> Result<T, E> + Send + Sync + 'static,
    E: Into<BoxError>,
  {
    let construct: ConstructFn = Arc::new(move |args: &Arguments| {
      let owner = args.receiver::<O>().map_err(into_cause)?;
      invoke(&*owner, args).map(Element::new).map_err(into_cause)
    });
    let owner = ElementParameter {
      target: ElementType::of::<O>(),
      name: owner_name.map(str::to_owned),
      optional: false,
    };
    let parameters = std::mem::take(&mut self.parameters);
    self.finish(ConstructionSite::FactoryMethod {
      owner,
      method: method.to_owned(),
      parameters,
      construct,
    })
  }

  pub fn supplied(self, instance: T) -> Declaration {
    self.supplied_shared(Arc::new(instance))
  }
}
