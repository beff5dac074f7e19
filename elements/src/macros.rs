//! Public macros for ergonomic element resolution.

/// Resolves an element from a container, panicking if it cannot be built.
///
/// Use it where a missing or broken element is a programming error. For a
/// non-panicking version call [`Container::get`](crate::Container::get) or
/// [`Container::get_named`](crate::Container::get_named) directly.
///
/// # Panics
///
/// Panics with the underlying [`ElementError`](crate::ElementError) when the
/// element is absent, ambiguous, part of a cycle or failed to construct.
///
/// # Examples
///
/// ```
/// use fibre_elements::{require, BoxError, Container, Declaration};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync { fn greet(&self) -> String; }
/// struct EnglishGreeter;
/// impl Greeter for EnglishGreeter { fn greet(&self) -> String { "Hello!".to_string() } }
///
/// let container = Container::builder()
///   .declare(Declaration::builder::<String>().name("motd").supplied("hi".to_string()))
///   .declare(
///     Declaration::builder::<dyn Greeter>()
///       .shared_constructor(|_| Ok::<_, BoxError>(Arc::new(EnglishGreeter) as Arc<dyn Greeter>)),
///   )
///   .build()
///   .unwrap();
///
/// let motd = require!(container, String, "motd");
/// assert_eq!(*motd, "hi");
/// let greeter = require!(container, trait Greeter);
/// assert_eq!(greeter.greet(), "Hello!");
/// ```
#[macro_export]
macro_rules! require {
    // require!(container, trait MyTrait)
    ($container:expr, trait $trait_path:path) => {
        $container
            .get::<dyn $trait_path>()
            .unwrap_or_else(|error| {
                panic!(
                    "Failed to resolve required element {}: {}",
                    std::any::type_name::<dyn $trait_path>(),
                    error
                )
            })
    };

    // require!(container, trait MyTrait, "name")
    ($container:expr, trait $trait_path:path, $name:expr) => {
        $container
            .get_named::<dyn $trait_path>($name)
            .unwrap_or_else(|error| {
                panic!(
                    "Failed to resolve required element '{}': {}",
                    $name, error
                )
            })
    };

    // require!(container, MyType)
    ($container:expr, $type:ty) => {
        $container
            .get::<$type>()
            .unwrap_or_else(|error| {
                panic!(
                    "Failed to resolve required element {}: {}",
                    std::any::type_name::<$type>(),
                    error
                )
            })
    };

    // require!(container, MyType, "name")
    ($container:expr, $type:ty, $name:expr) => {
        $container
            .get_named::<$type>($name)
            .unwrap_or_else(|error| {
                panic!(
                    "Failed to resolve required element '{}': {}",
                    $name, error
                )
            })
    };
}
