//! # Fibre Elements
//!
//! A thread-safe, declaration-driven Inversion of Control (IoC) container for Rust.
//!
//! Elements are described up front by immutable [`Declaration`]s and handed to a
//! [`ContainerBuilder`]. Building the container filters the declarations by the
//! active profiles and indexes the survivors by name and by type. Elements are then
//! constructed lazily on first request (or all at once with `eager`), with their
//! dependencies resolved first and circular dependencies reported as errors instead
//! of overflowing the stack.
//!
//! ## Core Concepts
//!
//! - **Declaration**: Name, type, scope, construction site, parameters, profile gates and
//!   post-init hooks of one element.
//! - **Scope**: `Singleton` elements are built once and shared. `Prototype` elements are
//!   built fresh for every request.
//! - **Profiles**: Declarations can require or forbid named profiles; inactive ones are
//!   invisible to every lookup.
//! - **Properties**: Scalar parameters are read from a [`PropertyResolver`] and parsed
//!   with `FromStr`.
//! - **Failures**: A singleton that failed once stays failed; every later request returns
//!   the same error.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_elements::{BoxError, Container, Declaration, MapProperties, Parameter};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct EnglishGreeter {
//!     message: String,
//! }
//!
//! impl Greeter for EnglishGreeter {
//!     fn greet(&self) -> String {
//!         self.message.clone()
//!     }
//! }
//!
//! fn main() -> Result<(), BoxError> {
//!     let container = Container::builder()
//!         .properties(MapProperties::new().with("greeting", "Hello, World!"))
//!         .declare(
//!             Declaration::builder::<dyn Greeter>()
//!                 .name("greeter")
//!                 .parameter(Parameter::property::<String>("greeting"))
//!                 .shared_constructor(|args| {
//!                     let message = args.value::<String>(0)?;
//!                     Ok::<_, BoxError>(Arc::new(EnglishGreeter { message }) as Arc<dyn Greeter>)
//!                 }),
//!         )
//!         .build()?;
//!
//!     let greeter = container.get::<dyn Greeter>()?;
//!     assert_eq!(greeter.greet(), "Hello, World!");
//!     Ok(())
//! }
//! ```

mod config;
mod container;
mod context;
mod declaration;
mod element;
mod error;
mod hooks;
mod macros;
mod path;
mod profile;
mod properties;
mod registry;
mod resolver;
mod validate;
mod waits;

pub use config::{ConfigError, ContainerConfig};
pub use container::{Container, ContainerBuilder, ACTIVE_PROFILES, PROPERTIES};
pub use context::{ElementContext, ElementState};
pub use declaration::{
  ConstructionSite, Declaration, DeclarationBuilder, ElementParameter, Hook, Parameter, PropertyParameter,
};
pub use element::{Element, ElementType, Scope};
pub use error::{BoxError, Cause, ElementError, Result};
pub use path::{PathGuard, ResolutionPath};
pub use profile::{is_active, ActiveProfiles};
pub use properties::{MapProperties, PropertyResolver};
pub use resolver::Arguments;
