//! The resolution path used to detect circular dependencies.

use crate::error::{ElementError, Result};
use std::ops::{Deref, DerefMut};

/// The names of the elements being built on the current call chain,
/// outermost first.
///
/// One path is created per top-level request and threaded through the
/// recursive resolution. Entries are only added through [`PathGuard`], which
/// removes them again however the nested resolution ends.
#[derive(Debug, Default)]
pub struct ResolutionPath {
  names: Vec<String>,
}

impl ResolutionPath {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.names.iter().any(|n| n == name)
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }

  /// The cycle closed by requesting `name` again, starting at its first
  /// occurrence: `a -> b -> a`.
  pub fn cycle_to(&self, name: &str) -> Vec<String> {
    let start = self.names.iter().position(|n| n == name).unwrap_or(0);
    let mut cycle: Vec<String> = self.names[start..].to_vec();
    cycle.push(name.to_owned());
    cycle
  }

  /// Pushes `name` onto the path, failing if it is already on it.
  ///
  /// The check happens before the push, so a rejected name leaves the path
  /// untouched.
  pub fn enter(&mut self, name: &str) -> Result<PathGuard<'_>> {
    if self.contains(name) {
      return Err(ElementError::CircularDependency {
        cycle: self.cycle_to(name),
      });
    }
    self.names.push(name.to_owned());
    Ok(PathGuard { path: self })
  }
}

/// An RAII guard for one entry of the resolution path.
///
/// Dereferences to the path so nested resolution can keep extending it. The
/// entry is popped when the guard is dropped, on success, error or unwind.
pub struct PathGuard<'p> {
  path: &'p mut ResolutionPath,
}

impl Deref for PathGuard<'_> {
  type Target = ResolutionPath;

  fn deref(&self) -> &ResolutionPath {
    self.path
  }
}

impl DerefMut for PathGuard<'_> {
  fn deref_mut(&mut self) -> &mut ResolutionPath {
    self.path
  }
}

impl Drop for PathGuard<'_> {
  fn drop(&mut self) {
    self.path.names.pop();
  }
}
