//! Runs post-initialization hooks on freshly constructed instances.

use crate::declaration::Declaration;
use crate::element::Element;
use crate::error::{ElementError, Result};
use tracing::debug;

/// Runs every hook of `declaration` on `instance`, in registration order.
///
/// The first failing hook stops the run. Hooks that already ran are not
/// undone.
pub(crate) fn run_post_init(declaration: &Declaration, instance: &Element) -> Result<()> {
  for hook in declaration.post_init() {
    debug!(element = declaration.name(), hook = hook.name(), "Running post-init hook");
    hook.run(instance).map_err(|cause| ElementError::PostInit {
      element: declaration.name().to_owned(),
      hook: hook.name().to_owned(),
      cause,
    })?;
  }
  Ok(())
}
