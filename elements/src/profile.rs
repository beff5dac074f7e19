//! Profile-based activation of declarations.

use std::collections::BTreeSet;
use std::fmt;

/// The immutable set of profiles active for one container.
///
/// Available to elements as the pre-built `activeProfiles` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveProfiles {
  names: BTreeSet<String>,
}

impl ActiveProfiles {
  pub fn new<I, S>(names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      names: names.into_iter().map(Into::into).collect(),
    }
  }

  pub fn contains(&self, profile: &str) -> bool {
    self.names.contains(profile)
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.names.iter().map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }
}

impl fmt::Display for ActiveProfiles {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let names: Vec<&str> = self.iter().collect();
    write!(f, "[{}]", names.join(", "))
  }
}

/// Decides whether a declaration participates in the container.
///
/// Active iff every required profile is active and no forbidden profile is.
/// Empty sets impose no constraint.
pub fn is_active(
  required: &BTreeSet<String>,
  forbidden: &BTreeSet<String>,
  active: &ActiveProfiles,
) -> bool {
  required.iter().all(|p| active.contains(p)) && !forbidden.iter().any(|p| active.contains(p))
}
