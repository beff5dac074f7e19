//! The per-declaration runtime unit and its construction state machine.

use crate::declaration::{ConstructionSite, Declaration};
use crate::element::{Element, Scope};
use crate::error::{into_cause, ElementError, Result};
use crate::hooks::run_post_init;
use crate::path::ResolutionPath;
use crate::resolver::Arguments;
use crate::waits::WaitGraph;

use once_cell::sync::OnceCell;
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::thread::{self, ThreadId};
use tracing::{debug, warn};

/// Supplies the resolved arguments for a declaration's construction site.
pub(crate) trait ArgumentSource {
  fn arguments(&self, declaration: &Declaration, path: &mut ResolutionPath) -> Result<Arguments>;

  /// The container-wide record of threads blocked on other threads' builds.
  fn waits(&self) -> &WaitGraph;
}

/// The observable lifecycle state of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementState {
  NotInitialized,
  UnderConstruction,
  Initialized,
  Failed,
}

enum Slot {
  NotInitialized,
  UnderConstruction(ThreadId),
  Initialized(Element),
  Failed(ElementError),
}

/// Owns one declaration, its singleton instance and the lock serializing its
/// construction.
///
/// Singletons move `NotInitialized -> UnderConstruction -> Initialized | Failed`
/// exactly once. Prototypes construct on every request and never leave
/// `NotInitialized`. Contexts for supplied instances start out `Initialized`.
pub struct ElementContext {
  declaration: Declaration,
  instance: OnceCell<Element>,
  slot: Mutex<Slot>,
  settled: Condvar,
}

impl ElementContext {
  pub(crate) fn new(declaration: Declaration) -> Self {
    let (instance, slot) = match declaration.site() {
      ConstructionSite::Supplied(element) => (
        OnceCell::with_value(element.clone()),
        Slot::Initialized(element.clone()),
      ),
      _ => (OnceCell::new(), Slot::NotInitialized),
    };
    Self {
      declaration,
      instance,
      slot: Mutex::new(slot),
      settled: Condvar::new(),
    }
  }

  pub fn name(&self) -> &str {
    self.declaration.name()
  }

  pub fn declaration(&self) -> &Declaration {
    &self.declaration
  }

  pub fn scope(&self) -> Scope {
    self.declaration.scope()
  }

  pub fn state(&self) -> ElementState {
    match &*self.slot.lock() {
      Slot::NotInitialized => ElementState::NotInitialized,
      Slot::UnderConstruction(_) => ElementState::UnderConstruction,
      Slot::Initialized(_) => ElementState::Initialized,
      Slot::Failed(_) => ElementState::Failed,
    }
  }

  /// The cached singleton instance, if it has been built.
  pub fn instance(&self) -> Option<Element> {
    self.instance.get().cloned()
  }

  /// Returns the instance, constructing it first when needed.
  pub(crate) fn request_instance(
    &self,
    source: &dyn ArgumentSource,
    path: &mut ResolutionPath,
  ) -> Result<Element> {
    if let Some(instance) = self.instance() {
      return Ok(instance);
    }
    match self.scope() {
      Scope::Prototype => self.construct(source, path),
      Scope::Singleton => self.initialize_singleton(source, path),
    }
  }

  /// Walks the state machine without handing out the instance. A no-op for
  /// singletons that are already initialized; supplied elements refuse.
  pub(crate) fn initialize(&self, source: &dyn ArgumentSource, path: &mut ResolutionPath) -> Result<()> {
    self.reject_supplied()?;
    self.request_instance(source, path).map(drop)
  }

  pub(crate) fn reject_supplied(&self) -> Result<()> {
    if self.declaration.is_supplied() {
      return Err(ElementError::AlreadyInitialized {
        element: self.name().to_owned(),
      });
    }
    Ok(())
  }

  fn initialize_singleton(
    &self,
    source: &dyn ArgumentSource,
    path: &mut ResolutionPath,
  ) -> Result<Element> {
    let me = thread::current().id();
    let waits = source.waits();
    {
      let mut slot = self.slot.lock();
      loop {
        let builder = match &*slot {
          Slot::Initialized(instance) => return Ok(instance.clone()),
          Slot::Failed(error) => return Err(error.clone()),
          Slot::UnderConstruction(builder) => *builder,
          Slot::NotInitialized => break,
        };
        // Same thread, different call chain: waiting would never end.
        if builder == me {
          return Err(ElementError::CircularDependency {
            cycle: path.cycle_to(self.name()),
          });
        }
        waits
          .block_on(me, self.name(), builder)
          .map_err(|cycle| ElementError::CircularDependency { cycle })?;
        self.settled.wait(&mut slot);
        waits.unblock(me);
      }
      *slot = Slot::UnderConstruction(me);
    }

    let mut ticket = ConstructionTicket {
      context: self,
      waits,
      settled: false,
    };
    let outcome = self.construct(source, path);
    ticket.settle(&outcome);
    outcome
  }

  fn construct(&self, source: &dyn ArgumentSource, path: &mut ResolutionPath) -> Result<Element> {
    debug!(element = self.name(), scope = ?self.scope(), "Constructing element");
    let args = source.arguments(&self.declaration, path)?;
    let instance = self.declaration.site().invoke(self.name(), &args)?;
    run_post_init(&self.declaration, &instance)?;
    debug!(element = self.name(), "Element ready");
    Ok(instance)
  }
}

impl fmt::Debug for ElementContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ElementContext")
      .field("name", &self.name())
      .field("type", &self.declaration.declared_type())
      .field("scope", &self.scope())
      .field("state", &self.state())
      .finish()
  }
}

/// Publishes the outcome of one singleton construction.
///
/// If the constructing code panics the ticket is dropped unsettled and marks
/// the element failed, so threads waiting on it wake up.
struct ConstructionTicket<'a> {
  context: &'a ElementContext,
  waits: &'a WaitGraph,
  settled: bool,
}

impl ConstructionTicket<'_> {
  fn settle(&mut self, outcome: &Result<Element>) {
    let context = self.context;
    let mut slot = context.slot.lock();
    *slot = match outcome {
      Ok(instance) => {
        let _ = context.instance.set(instance.clone());
        Slot::Initialized(instance.clone())
      }
      Err(error) => {
        warn!(element = context.name(), %error, "Element failed, later requests will fail too");
        Slot::Failed(error.clone())
      }
    };
    self.settled = true;
    self.waits.release(context.name());
    context.settled.notify_all();
  }
}

impl Drop for ConstructionTicket<'_> {
  fn drop(&mut self) {
    if self.settled {
      return;
    }
    let context = self.context;
    let mut slot = context.slot.lock();
    *slot = Slot::Failed(ElementError::Construction {
      element: context.name().to_owned(),
      cause: into_cause("panicked during construction"),
    });
    self.waits.release(context.name());
    context.settled.notify_all();
  }
}
