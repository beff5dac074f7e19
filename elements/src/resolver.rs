//! Dependency resolution: turns a declaration's parameter list into ordered
//! argument values, constructing dependencies on the way.

use crate::context::{ArgumentSource, ElementContext};
use crate::declaration::{Declaration, ElementParameter, Parameter, PropertyParameter};
use crate::element::Element;
use crate::error::{ElementError, Result};
use crate::path::ResolutionPath;
use crate::properties::PropertyResolver;
use crate::registry::Registry;
use crate::waits::WaitGraph;

use std::any::{type_name, Any};
use std::sync::Arc;
use tracing::trace;

/// The resolved arguments for one construction, in parameter order.
///
/// Values are read by index with the type the parameter was declared with.
/// Optional dependencies that were not found are stored as absent.
#[derive(Debug, Clone)]
pub struct Arguments {
  element: String,
  receiver: Option<Element>,
  values: Vec<Option<Element>>,
}

impl Arguments {
  pub(crate) fn empty(element: &str) -> Self {
    Self {
      element: element.to_owned(),
      receiver: None,
      values: Vec::new(),
    }
  }

  /// The name of the element these arguments are for.
  pub fn element(&self) -> &str {
    &self.element
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// The value at `index` as an `Arc<T>`.
  pub fn get<T: ?Sized + Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>> {
    match self.optional::<T>(index)? {
      Some(value) => Ok(value),
      None => Err(self.invalid(index, "optional dependency is absent".to_owned())),
    }
  }

  /// The value at `index`, or `None` for an absent optional dependency.
  pub fn optional<T: ?Sized + Any + Send + Sync>(&self, index: usize) -> Result<Option<Arc<T>>> {
    let slot = self.values.get(index).ok_or_else(|| {
      self.invalid(
        index,
        format!("only {} argument(s) were resolved", self.values.len()),
      )
    })?;
    slot
      .as_ref()
      .map(|value| self.downcast::<T>(index, value))
      .transpose()
  }

  /// A clone of the value at `index`, convenient for property scalars.
  pub fn value<T: Clone + Any + Send + Sync>(&self, index: usize) -> Result<T> {
    self.get::<T>(index).map(|value| (*value).clone())
  }

  /// The owner element of a factory method.
  pub fn receiver<T: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<T>> {
    let receiver = self.receiver.as_ref().ok_or_else(|| ElementError::InvalidArgument {
      element: self.element.clone(),
      index: 0,
      reason: "no factory owner was resolved".to_owned(),
    })?;
    receiver
      .downcast::<T>()
      .ok_or_else(|| ElementError::TypeMismatch {
        element: self.element.clone(),
        expected: type_name::<T>(),
        actual: receiver.type_name(),
      })
  }

  fn downcast<T: ?Sized + Any + Send + Sync>(&self, index: usize, value: &Element) -> Result<Arc<T>> {
    value.downcast::<T>().ok_or_else(|| {
      self.invalid(
        index,
        format!("expected {}, found {}", type_name::<T>(), value.type_name()),
      )
    })
  }

  fn invalid(&self, index: usize, reason: String) -> ElementError {
    ElementError::InvalidArgument {
      element: self.element.clone(),
      index,
      reason,
    }
  }
}

/// Resolves parameters against one container's registry and property source.
///
/// Element parameters recurse into [`Resolver::resolve`], which is also the
/// entry point for top-level requests. Every element on the way is put on
/// the resolution path before it is constructed.
pub(crate) struct Resolver<'c> {
  registry: &'c Registry,
  properties: &'c dyn PropertyResolver,
}

impl<'c> Resolver<'c> {
  pub(crate) fn new(registry: &'c Registry, properties: &'c dyn PropertyResolver) -> Self {
    Self {
      registry,
      properties,
    }
  }

  /// Returns the instance of `context`, constructing it if necessary.
  pub(crate) fn resolve(&self, context: &ElementContext, path: &mut ResolutionPath) -> Result<Element> {
    if let Some(instance) = context.instance() {
      trace!(element = context.name(), "Using cached instance");
      return Ok(instance);
    }
    let mut guard = path.enter(context.name())?;
    context.request_instance(self, &mut guard)
  }

  /// Walks the state machine of `context` without returning its instance.
  pub(crate) fn initialize(&self, context: &ElementContext, path: &mut ResolutionPath) -> Result<()> {
    context.reject_supplied()?;
    if context.instance().is_some() {
      return Ok(());
    }
    let mut guard = path.enter(context.name())?;
    context.initialize(self, &mut guard)
  }

  fn resolve_element(
    &self,
    parameter: &ElementParameter,
    path: &mut ResolutionPath,
  ) -> Result<Option<Element>> {
    let context = match self.registry.lookup(parameter) {
      Ok(context) => context,
      Err(error) if parameter.is_optional() && error.is_not_found() => {
        trace!(dependency = %parameter, "Optional dependency is absent");
        return Ok(None);
      }
      Err(error) => return Err(error),
    };
    self.resolve(context, path).map(Some)
  }

  fn resolve_property(&self, element: &str, parameter: &PropertyParameter) -> Result<Element> {
    let raw = match self.properties.resolve(parameter.name()) {
      Some(raw) => raw,
      None => parameter
        .default_value()
        .map(str::to_owned)
        .ok_or_else(|| ElementError::PropertyNotFound {
          element: element.to_owned(),
          property: parameter.name().to_owned(),
        })?,
    };
    parameter
      .convert(&raw)
      .map_err(|cause| ElementError::PropertyConversion {
        element: element.to_owned(),
        property: parameter.name().to_owned(),
        target: parameter.target(),
        cause,
      })
  }
}

impl ArgumentSource for Resolver<'_> {
  /// Resolves the factory owner first, then each parameter strictly in
  /// order. The first failure aborts the rest.
  fn arguments(&self, declaration: &Declaration, path: &mut ResolutionPath) -> Result<Arguments> {
    let element = declaration.name();
    let receiver = match declaration.site().owner() {
      Some(owner) => self.resolve_element(owner, path)?,
      None => None,
    };

    let parameters = declaration.parameters();
    let mut values = Vec::with_capacity(parameters.len());
    for parameter in parameters {
      let value = match parameter {
        Parameter::Element(dependency) => self.resolve_element(dependency, path)?,
        Parameter::Property(property) => Some(self.resolve_property(element, property)?),
      };
      values.push(value);
    }

    Ok(Arguments {
      element: element.to_owned(),
      receiver,
      values,
    })
  }

  fn waits(&self) -> &WaitGraph {
    self.registry.waits()
  }
}
