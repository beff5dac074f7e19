//! The property lookup seam used for property-typed parameters.

use serde_yaml::Value;
use std::collections::BTreeMap;

/// Supplies raw property values by name.
///
/// Conversion to the parameter's target type happens on the container side,
/// so implementations only deal with strings.
pub trait PropertyResolver: Send + Sync {
  fn resolve(&self, name: &str) -> Option<String>;
}

impl<F> PropertyResolver for F
where
  F: Fn(&str) -> Option<String> + Send + Sync,
{
  fn resolve(&self, name: &str) -> Option<String> {
    self(name)
  }
}

/// A fixed map of properties keyed by dotted names such as `server.port`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapProperties {
  values: BTreeMap<String, String>,
}

impl MapProperties {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.insert(name, value);
    self
  }

  pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.values.insert(name.into(), value.into());
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Flattens a YAML document into dotted keys.
  ///
  /// Nested mappings contribute a path segment per level, sequences are
  /// indexed (`hosts.0`), scalars are rendered as strings and nulls are skipped.
  pub fn from_yaml(value: &Value) -> Self {
    let mut properties = Self::new();
    flatten_into(&mut properties.values, String::new(), value);
    properties
  }

  /// Merges `other` into `self`, `other` winning on conflicts.
  pub fn merge(&mut self, other: MapProperties) {
    self.values.extend(other.values);
  }
}

impl PropertyResolver for MapProperties {
  fn resolve(&self, name: &str) -> Option<String> {
    self.values.get(name).cloned()
  }
}

fn flatten_into(out: &mut BTreeMap<String, String>, prefix: String, value: &Value) {
  let child = |key: &str| {
    if prefix.is_empty() {
      key.to_owned()
    } else {
      format!("{}.{}", prefix, key)
    }
  };

  match value {
    Value::Null => {}
    Value::Bool(b) => {
      out.insert(prefix, b.to_string());
    }
    Value::Number(n) => {
      out.insert(prefix, n.to_string());
    }
    Value::String(s) => {
      out.insert(prefix, s.clone());
    }
    Value::Sequence(items) => {
      for (index, item) in items.iter().enumerate() {
        flatten_into(out, child(&index.to_string()), item);
      }
    }
    Value::Mapping(map) => {
      for (key, item) in map {
        let key = match key {
          Value::String(s) => s.clone(),
          Value::Number(n) => n.to_string(),
          Value::Bool(b) => b.to_string(),
          // Composite keys have no dotted form.
          _ => continue,
        };
        flatten_into(out, child(&key), item);
      }
    }
    Value::Tagged(tagged) => flatten_into(out, prefix, &tagged.value),
  }
}
