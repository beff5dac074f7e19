//! The name and type indices over all active element contexts.

use crate::context::ElementContext;
use crate::declaration::{Declaration, ElementParameter};
use crate::element::ElementType;
use crate::error::{ElementError, Result};
use crate::profile::{is_active, ActiveProfiles};
use crate::waits::WaitGraph;

use ahash::{HashMap, HashMapExt};
use tracing::debug;

/// Every active context, in declaration order, plus lookup indices.
///
/// Built once and never mutated afterwards; only the contexts' own state
/// changes.
pub(crate) struct Registry {
  contexts: Vec<ElementContext>,
  by_name: HashMap<String, usize>,
  by_type: HashMap<ElementType, Vec<usize>>,
  waits: WaitGraph,
}

impl Registry {
  /// Wraps each declaration admitted by the active profiles in a context and
  /// indexes it. Inactive declarations are dropped before the uniqueness
  /// check, so they may share a name with an active one.
  pub(crate) fn register_all(
    declarations: impl IntoIterator<Item = Declaration>,
    active: &ActiveProfiles,
  ) -> Result<Self> {
    let mut registry = Registry {
      contexts: Vec::new(),
      by_name: HashMap::new(),
      by_type: HashMap::new(),
      waits: WaitGraph::new(),
    };

    for declaration in declarations {
      if !is_active(
        declaration.required_profiles(),
        declaration.forbidden_profiles(),
        active,
      ) {
        debug!(element = declaration.name(), profiles = %active, "Declaration excluded by profiles");
        continue;
      }
      if registry.by_name.contains_key(declaration.name()) {
        return Err(ElementError::DuplicateName {
          name: declaration.name().to_owned(),
        });
      }

      let index = registry.contexts.len();
      registry.by_name.insert(declaration.name().to_owned(), index);
      registry
        .by_type
        .entry(declaration.declared_type())
        .or_default()
        .push(index);
      registry.contexts.push(ElementContext::new(declaration));
    }

    Ok(registry)
  }

  pub(crate) fn contexts(&self) -> &[ElementContext] {
    &self.contexts
  }

  pub(crate) fn waits(&self) -> &WaitGraph {
    &self.waits
  }

  pub(crate) fn get(&self, name: &str) -> Option<&ElementContext> {
    self.position(name).map(|index| &self.contexts[index])
  }

  /// The declaration-order index of the context called `name`.
  pub(crate) fn position(&self, name: &str) -> Option<usize> {
    self.by_name.get(name).copied()
  }

  pub(crate) fn by_name(&self, name: &str) -> Result<&ElementContext> {
    self.get(name).ok_or_else(|| ElementError::NotFoundByName {
      name: name.to_owned(),
    })
  }

  /// The single active context declared with type `ty`.
  pub(crate) fn by_type(&self, ty: ElementType) -> Result<&ElementContext> {
    match self.by_type.get(&ty).map(Vec::as_slice) {
      None | Some([]) => Err(ElementError::NotFoundByType {
        type_name: ty.name().to_owned(),
      }),
      Some([index]) => Ok(&self.contexts[*index]),
      Some(indices) => Err(ElementError::Ambiguous {
        type_name: ty.name().to_owned(),
        candidates: indices
          .iter()
          .map(|&index| self.contexts[index].name().to_owned())
          .collect(),
      }),
    }
  }

  /// Every active context declared with type `ty`, in declaration order.
  pub(crate) fn all_of_type(&self, ty: ElementType) -> impl Iterator<Item = &ElementContext> {
    self
      .by_type
      .get(&ty)
      .into_iter()
      .flatten()
      .map(|&index| &self.contexts[index])
  }

  /// Looks up the target of an element parameter: by its name hint when it
  /// has one, by type otherwise. A named target must carry the expected type.
  pub(crate) fn lookup(&self, parameter: &ElementParameter) -> Result<&ElementContext> {
    match parameter.name() {
      Some(name) => {
        let context = self.by_name(name)?;
        let actual = context.declaration().declared_type();
        if actual != parameter.target() {
          return Err(ElementError::TypeMismatch {
            element: name.to_owned(),
            expected: parameter.target().name(),
            actual: actual.name(),
          });
        }
        Ok(context)
      }
      None => self.by_type(parameter.target()),
    }
  }
}
