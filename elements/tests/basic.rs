use fibre_elements::{
  Arguments, BoxError, Container, Declaration, ElementError, ElementType, MapProperties, Parameter, Scope,
};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// --- Test Fixtures ---

// The trait must be Send + Sync for the container to accept it.
trait Greeter: Send + Sync {
  fn greet(&self) -> String;
}

struct EnglishGreeter;
impl Greeter for EnglishGreeter {
  fn greet(&self) -> String {
    "Hello!".to_string()
  }
}

struct SpanishGreeter;
impl Greeter for SpanishGreeter {
  fn greet(&self) -> String {
    "¡Hola!".to_string()
  }
}

#[derive(Debug, PartialEq, Eq)]
struct SimpleService {
  id: usize,
}

fn counting_service(counter: Arc<AtomicUsize>) -> impl Fn(&Arguments) -> Result<SimpleService, BoxError> {
  move |_: &Arguments| {
    Ok(SimpleService {
      id: counter.fetch_add(1, Ordering::SeqCst),
    })
  }
}

// --- Basic Tests ---

#[test]
fn test_singleton_is_constructed_once() {
  // Arrange
  let counter = Arc::new(AtomicUsize::new(0));
  let container = Container::builder()
    .declare(Declaration::builder::<SimpleService>().constructor(counting_service(counter.clone())))
    .build()
    .unwrap();

  // Act
  let r1 = container.get::<SimpleService>().unwrap();
  let r2 = container.get::<SimpleService>().unwrap();

  // Assert
  assert_eq!(r1.id, 0);
  // Ensure it's a singleton by checking pointer equality.
  assert!(Arc::ptr_eq(&r1, &r2));
  assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_prototype_is_constructed_per_request() {
  // Arrange
  let counter = Arc::new(AtomicUsize::new(0));
  let container = Container::builder()
    .declare(
      Declaration::builder::<SimpleService>()
        .name("tracker")
        .scope(Scope::Prototype)
        .constructor(counting_service(counter.clone())),
    )
    .build()
    .unwrap();

  // Act
  let r1 = container.get_named::<SimpleService>("tracker").unwrap();
  let r2 = container.get_named::<SimpleService>("tracker").unwrap();

  // Assert
  assert_eq!((r1.id, r2.id), (0, 1));
  assert!(!Arc::ptr_eq(&r1, &r2));
  assert!(container.context("tracker").unwrap().instance().is_none());
}

#[test]
fn test_default_name_is_the_type_name() {
  // Arrange
  let container = Container::builder()
    .declare(Declaration::builder::<SimpleService>().supplied(SimpleService { id: 7 }))
    .build()
    .unwrap();

  // Act
  let by_name = container
    .get_named::<SimpleService>(std::any::type_name::<SimpleService>())
    .unwrap();

  // Assert
  assert_eq!(by_name.id, 7);
}

#[test]
fn test_trait_object_resolution() {
  // Arrange
  let container = Container::builder()
    .declare(
      Declaration::builder::<dyn Greeter>()
        .shared_constructor(|_| Ok::<_, BoxError>(Arc::new(EnglishGreeter) as Arc<dyn Greeter>)),
    )
    .build()
    .unwrap();

  // Act
  let greeter = container.get::<dyn Greeter>().unwrap();

  // Assert
  assert_eq!(greeter.greet(), "Hello!");
}

#[test]
fn test_ambiguous_type_needs_a_name() {
  // Arrange
  let container = Container::builder()
    .declare(
      Declaration::builder::<dyn Greeter>()
        .name("english")
        .shared_constructor(|_| Ok::<_, BoxError>(Arc::new(EnglishGreeter) as Arc<dyn Greeter>)),
    )
    .declare(
      Declaration::builder::<dyn Greeter>()
        .name("spanish")
        .shared_constructor(|_| Ok::<_, BoxError>(Arc::new(SpanishGreeter) as Arc<dyn Greeter>)),
    )
    .build()
    .unwrap();

  // Act
  let by_type = container.get::<dyn Greeter>();
  let spanish = container.get_named::<dyn Greeter>("spanish").unwrap();

  // Assert
  match by_type {
    Err(ElementError::Ambiguous { candidates, .. }) => assert_eq!(candidates, vec!["english", "spanish"]),
    Err(other) => panic!("expected an ambiguity error, got {other}"),
    Ok(_) => panic!("expected an ambiguity error"),
  }
  assert_eq!(spanish.greet(), "¡Hola!");
}

#[test]
fn test_get_all_returns_every_candidate_in_declaration_order() {
  // Arrange
  let container = Container::builder()
    .declare(
      Declaration::builder::<dyn Greeter>()
        .name("spanish")
        .shared_constructor(|_| Ok::<_, BoxError>(Arc::new(SpanishGreeter) as Arc<dyn Greeter>)),
    )
    .declare(
      Declaration::builder::<dyn Greeter>()
        .name("english")
        .shared_constructor(|_| Ok::<_, BoxError>(Arc::new(EnglishGreeter) as Arc<dyn Greeter>)),
    )
    .build()
    .unwrap();

  // Act
  let greetings: Vec<String> = container
    .get_all::<dyn Greeter>()
    .unwrap()
    .iter()
    .map(|g| g.greet())
    .collect();

  // Assert
  assert_eq!(greetings, vec!["¡Hola!", "Hello!"]);
  assert!(container.get_all::<SimpleService>().unwrap().is_empty());
}

#[test]
fn test_missing_element() {
  // Arrange
  let container = Container::builder().build().unwrap();

  // Act
  let by_name = container.get_element("ghost").unwrap_err();
  let by_type = container.get::<SimpleService>().unwrap_err();

  // Assert
  assert_eq!(by_name.to_string(), "No active element named 'ghost'");
  assert!(by_name.is_not_found());
  assert!(matches!(by_type, ElementError::NotFoundByType { .. }));
}

#[test]
fn test_untyped_access() {
  // Arrange
  let container = Container::builder()
    .declare(Declaration::builder::<u64>().name("answer").supplied(42))
    .build()
    .unwrap();

  // Act
  let element = container.get_element_by_type(ElementType::of::<u64>()).unwrap();

  // Assert
  assert_eq!(element.type_name(), "u64");
  assert_eq!(element.downcast::<u64>().as_deref(), Some(&42));
  assert!(element.ptr_eq(&container.get_element("answer").unwrap()));
}

#[test]
fn test_property_injection() {
  // Arrange
  struct Server {
    port: u16,
    workers: usize,
  }
  let container = Container::builder()
    .properties(MapProperties::new().with("server.port", "8080"))
    .declare(
      Declaration::builder::<Server>()
        .parameter(Parameter::property::<u16>("server.port"))
        .parameter(Parameter::property_or::<usize>("server.workers", "4"))
        .constructor(|args| {
          Ok::<_, ElementError>(Server {
            port: args.value(0)?,
            workers: args.value(1)?,
          })
        }),
    )
    .build()
    .unwrap();

  // Act
  let server = container.get::<Server>().unwrap();

  // Assert
  assert_eq!(server.port, 8080);
  assert_eq!(server.workers, 4);
}

#[test]
fn test_properties_from_a_closure() {
  // Arrange
  let container = Container::builder()
    .properties(|name: &str| (name == "region").then(|| "eu-west".to_string()))
    .declare(
      Declaration::builder::<String>()
        .name("region")
        .parameter(Parameter::property::<String>("region"))
        .constructor(|args| args.value::<String>(0)),
    )
    .build()
    .unwrap();

  // Act & Assert
  assert_eq!(*container.get_named::<String>("region").unwrap(), "eu-west");
}

#[test]
fn test_factory_method_on_owner_element() {
  // Arrange
  struct ConnectionFactory {
    url: String,
  }
  impl ConnectionFactory {
    fn open(&self, timeout: u64) -> Connection {
      Connection {
        url: self.url.clone(),
        timeout,
      }
    }
  }
  struct Connection {
    url: String,
    timeout: u64,
  }

  let container = Container::builder()
    .declare(
      Declaration::builder::<ConnectionFactory>().supplied(ConnectionFactory {
        url: "postgres://db".to_string(),
      }),
    )
    .declare(
      Declaration::builder::<Connection>()
        .parameter(Parameter::property_or::<u64>("db.timeout", "30"))
        .factory_method::<ConnectionFactory, _, _>(None, "open", |factory, args| {
          Ok::<_, ElementError>(factory.open(args.value(0)?))
        }),
    )
    .build()
    .unwrap();

  // Act
  let connection = container.get::<Connection>().unwrap();

  // Assert
  assert_eq!(connection.url, "postgres://db");
  assert_eq!(connection.timeout, 30);
}

#[test]
fn test_optional_dependency_present_and_absent() {
  // Arrange
  struct Metrics;
  struct Service {
    metrics: Option<Arc<Metrics>>,
  }
  let service = || {
    Declaration::builder::<Service>()
      .parameter(Parameter::optional::<Metrics>())
      .constructor(|args| {
        Ok::<_, ElementError>(Service {
          metrics: args.optional::<Metrics>(0)?,
        })
      })
  };

  let without = Container::builder().declare(service()).build().unwrap();
  let with = Container::builder()
    .declare(Declaration::builder::<Metrics>().supplied(Metrics))
    .declare(service())
    .build()
    .unwrap();

  // Act & Assert
  assert!(without.get::<Service>().unwrap().metrics.is_none());
  let metrics = with.get::<Service>().unwrap().metrics.clone().unwrap();
  assert!(Arc::ptr_eq(&metrics, &with.get::<Metrics>().unwrap()));
}
