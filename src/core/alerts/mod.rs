// Alert delivery.
//
// - notifier.rs: console reporting, the Mailer seam and best-effort dispatch
// - smtp.rs: the lettre-backed Mailer used in production

pub mod notifier;
pub mod smtp;

pub use notifier::{email_body, report_console, Mailer, Notifier, ALERT_SUBJECT};
pub use smtp::SmtpMailer;
