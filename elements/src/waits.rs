//! Tracks which threads are blocked on singletons built by other threads.
//!
//! The resolution path only sees one thread's call chain. Two threads each
//! building one end of a cycle would otherwise wait on each other forever.

use ahash::{HashMap, HashMapExt};
use parking_lot::Mutex;
use std::thread::ThreadId;

struct Wait {
  element: String,
  builder: ThreadId,
}

/// Who waits on what, for one container.
///
/// Lock order: a context's slot lock may be held while taking this lock,
/// never the other way round.
pub(crate) struct WaitGraph {
  waits: Mutex<HashMap<ThreadId, Wait>>,
}

impl WaitGraph {
  pub(crate) fn new() -> Self {
    Self {
      waits: Mutex::new(HashMap::new()),
    }
  }

  /// Registers `waiter` as blocked on `element`, which `builder` is
  /// constructing.
  ///
  /// Fails with the element cycle when `builder` is, directly or through
  /// other threads, itself waiting on `waiter`. Nothing is registered then.
  pub(crate) fn block_on(&self, waiter: ThreadId, element: &str, builder: ThreadId) -> Result<(), Vec<String>> {
    let mut waits = self.waits.lock();
    let mut cycle = vec![element.to_owned()];
    let mut holder = builder;
    // Every thread appears at most once on a chain of waits.
    for _ in 0..=waits.len() {
      if holder == waiter {
        cycle.push(element.to_owned());
        return Err(cycle);
      }
      match waits.get(&holder) {
        Some(wait) => {
          cycle.push(wait.element.clone());
          holder = wait.builder;
        }
        None => break,
      }
    }
    waits.insert(
      waiter,
      Wait {
        element: element.to_owned(),
        builder,
      },
    );
    Ok(())
  }

  /// Removes the entry of `waiter` after it woke up.
  pub(crate) fn unblock(&self, waiter: ThreadId) {
    self.waits.lock().remove(&waiter);
  }

  /// Drops every wait on `element` once its construction settled, so no
  /// stale entry outlives the builder's hold on it.
  pub(crate) fn release(&self, element: &str) {
    self.waits.lock().retain(|_, wait| wait.element != element);
  }
}
