use fibre_elements::{require, BoxError, Container, Declaration, Parameter};
use std::panic;

struct UnregisteredService;
struct Dependent;

fn main() -> Result<(), BoxError> {
  let container = Container::builder()
    .declare(
      Declaration::builder::<Dependent>()
        .parameter(Parameter::element::<UnregisteredService>())
        .constructor(|_| Ok::<_, BoxError>(Dependent)),
    )
    .build()?;

  // --- Using the panicking `require!` macro ---
  println!("Attempting to resolve an element that was never declared...");

  let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
    // This line will panic!
    let _service = require!(container, UnregisteredService);
  }));

  assert!(result.is_err(), "require! should have panicked.");
  println!("Successfully caught the expected panic from require!.");

  // --- Using the non-panicking `get()` method ---
  println!("\nNow, attempting to resolve using the fallible `get()` method...");

  match container.get::<UnregisteredService>() {
    Ok(_) => panic!("Should not have found the element!"),
    Err(e) => println!("Correctly received an error: {}", e),
  }

  // --- Static validation catches the broken dependency without building anything ---
  match container.validate() {
    Ok(()) => panic!("Validation should have failed!"),
    Err(e) => println!("Validation report: {}", e),
  }
  Ok(())
}
