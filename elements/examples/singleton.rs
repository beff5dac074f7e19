use fibre_elements::{require, BoxError, Container, Declaration, Scope};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// A simple element that gets a unique ID upon creation.
struct RequestTracker {
  id: usize,
}

// A global, thread-safe counter to generate unique IDs.
static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn tracker(name: &str, scope: Scope) -> Declaration {
  Declaration::builder::<RequestTracker>()
    .name(name)
    .scope(scope)
    .constructor(|_| {
      println!("Creating RequestTracker...");
      Ok::<_, BoxError>(RequestTracker {
        id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
      })
    })
}

fn main() -> Result<(), BoxError> {
  // The singleton constructor runs ONCE, the prototype one on EVERY request.
  let container = Container::builder()
    .declare(tracker("singleton_tracker", Scope::Singleton))
    .declare(tracker("prototype_tracker", Scope::Prototype))
    .build()?;

  println!("--- Resolving Singletons ---");
  let s1 = require!(container, RequestTracker, "singleton_tracker");
  let s2 = require!(container, RequestTracker, "singleton_tracker");
  println!("Singleton 1 ID: {}, Singleton 2 ID: {}", s1.id, s2.id);
  assert_eq!(s1.id, 0);
  assert_eq!(s2.id, 0);
  assert!(
    Arc::ptr_eq(&s1, &s2),
    "Singleton instances should be identical"
  );
  println!("Singleton instances are the same pointer, as expected.\n");

  println!("--- Resolving Prototypes ---");
  let p1 = container.get_named::<RequestTracker>("prototype_tracker")?;
  let p2 = container.get_named::<RequestTracker>("prototype_tracker")?;
  println!("Prototype 1 ID: {}, Prototype 2 ID: {}", p1.id, p2.id);
  assert_eq!(p1.id, 1);
  assert_eq!(p2.id, 2);
  assert!(
    !Arc::ptr_eq(&p1, &p2),
    "Prototype instances should be different"
  );
  println!("Prototype instances are different pointers, as expected.");
  Ok(())
}
