use fibre_elements::{require, BoxError, Container, Declaration};
use std::sync::Arc;

// --- Abstraction and Implementations ---
trait MessageSender: Send + Sync {
  fn send(&self, to: &str, message: &str) -> String;
}

struct EmailSender;
impl MessageSender for EmailSender {
  fn send(&self, to: &str, message: &str) -> String {
    format!("Sending email to {}: '{}'", to, message)
  }
}

struct SmsSender;
impl MessageSender for SmsSender {
  fn send(&self, to: &str, message: &str) -> String {
    format!("Sending SMS to {}: '{}'", to, message)
  }
}

fn main() -> Result<(), BoxError> {
  // --- Declaration ---
  // Declare both implementations against the same trait, with unique names.
  let container = Container::builder()
    .declare(
      Declaration::builder::<dyn MessageSender>()
        .name("email")
        .shared_constructor(|_| Ok::<_, BoxError>(Arc::new(EmailSender) as Arc<dyn MessageSender>)),
    )
    .declare(
      Declaration::builder::<dyn MessageSender>()
        .name("sms")
        .shared_constructor(|_| Ok::<_, BoxError>(Arc::new(SmsSender) as Arc<dyn MessageSender>)),
    )
    .build()?;

  // --- Resolution ---
  // Asking by type alone is ambiguous; the name picks the implementation.
  if let Err(e) = container.get::<dyn MessageSender>() {
    println!("{}", e);
  }
  let email_notifier = require!(container, trait MessageSender, "email");
  let sms_notifier = require!(container, trait MessageSender, "sms");

  let result1 = email_notifier.send("test@example.com", "Hello from Fibre!");
  let result2 = sms_notifier.send("+123456789", "Hello from Fibre!");

  println!("{}", result1);
  println!("{}", result2);

  assert!(result1.contains("email"));
  assert!(result2.contains("SMS"));
  Ok(())
}
