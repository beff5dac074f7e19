//! Type descriptors, scopes and the type-erased instance handle.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identifies the type an element satisfies for type-based lookup.
///
/// Equality and hashing only consider the `TypeId`; the name is carried for
/// error messages and diagnostics.
#[derive(Clone, Copy)]
pub struct ElementType {
  id: TypeId,
  name: &'static str,
}

impl ElementType {
  pub fn of<T: ?Sized + Any>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: type_name::<T>(),
    }
  }

  pub fn id(&self) -> TypeId {
    self.id
  }

  pub fn name(&self) -> &'static str {
    self.name
  }
}

impl PartialEq for ElementType {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for ElementType {}

impl Hash for ElementType {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

impl fmt::Debug for ElementType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "ElementType({})", self.name)
  }
}

impl fmt::Display for ElementType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name)
  }
}

/// How many instances of an element the container hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
  /// One instance per container, built on first request and cached.
  #[default]
  Singleton,
  /// A fresh instance on every request. Never cached.
  Prototype,
}

/// A type-erased, shared handle to a constructed element.
///
/// The handle stores an `Arc<T>` behind `dyn Any`, which allows `T` to be an
/// unsized trait object. Cloning the handle never clones the element.
#[derive(Clone)]
pub struct Element {
  value: Arc<dyn Any + Send + Sync>,
  type_name: &'static str,
}

impl Element {
  pub fn new<T: Any + Send + Sync>(value: T) -> Self {
    Self::from_arc(Arc::new(value))
  }

  pub fn from_arc<T: ?Sized + Any + Send + Sync>(value: Arc<T>) -> Self {
    Self {
      value: Arc::new(value),
      type_name: type_name::<T>(),
    }
  }

  /// Returns the element as an `Arc<T>`, or `None` if it holds another type.
  pub fn downcast<T: ?Sized + Any + Send + Sync>(&self) -> Option<Arc<T>> {
    self.value.downcast_ref::<Arc<T>>().cloned()
  }

  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  /// Returns `true` if both handles point at the same instance.
  pub fn ptr_eq(&self, other: &Element) -> bool {
    Arc::ptr_eq(&self.value, &other.value)
  }
}

impl fmt::Debug for Element {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Element({})", self.type_name)
  }
}
