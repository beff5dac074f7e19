use fibre_elements::{require, BoxError, Container, Declaration, ElementError, Parameter};
use std::sync::Arc;

// 1. Define the abstraction (the trait)
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

// 2. Define a concrete implementation
struct ConsoleLogger {
  prefix: String,
}
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[{}]: {}", self.prefix, message);
  }
}

// 3. Define an element that depends on the abstraction
struct ReportService {
  logger: Arc<dyn Logger>,
}

impl ReportService {
  fn generate_report(&self) {
    self.logger.log("Starting report generation.");
    self.logger.log("Finished report generation.");
  }
}

fn main() -> Result<(), BoxError> {
  // Install a subscriber to watch the container build and construct elements.
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::new("fibre_elements=debug"))
    .init();

  let container = Container::builder()
    .properties(|name: &str| (name == "logger.prefix").then(|| "CONSOLE LOG".to_string()))
    // The container stores an Arc<ConsoleLogger> but serves it as Arc<dyn Logger>.
    .declare(
      Declaration::builder::<dyn Logger>()
        .parameter(Parameter::property::<String>("logger.prefix"))
        .shared_constructor(|args| {
          let prefix = args.value::<String>(0)?;
          Ok::<_, ElementError>(Arc::new(ConsoleLogger { prefix }) as Arc<dyn Logger>)
        }),
    )
    // ReportService does not create its logger; it receives it as parameter #0.
    .declare(
      Declaration::builder::<ReportService>()
        .parameter(Parameter::element::<dyn Logger>())
        .post_init("announce", |service: &ReportService| {
          service.logger.log("ReportService is ready.");
          Ok::<_, BoxError>(())
        })
        .constructor(|args| {
          Ok::<_, ElementError>(ReportService {
            logger: args.get::<dyn Logger>(0)?,
          })
        }),
    )
    .build()?;

  println!("Resolving the high-level element...");
  let report_service = require!(container, ReportService);

  println!("Using the element...");
  report_service.generate_report();
  Ok(())
}
