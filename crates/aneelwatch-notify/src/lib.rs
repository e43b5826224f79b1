//! Notification layer: renders a run summary and hands it to a mail transport.
//!
//! Delivery problems never fail a run; [`Notifier::notify`] reports them as a
//! [`Delivery`] outcome and logs them.

mod config;
mod error;
mod notifier;
#[cfg(feature = "smtp")]
mod smtp;

pub use config::MailConfig;
pub use error::MailError;
pub use notifier::{Delivery, MailMessage, Mailer, Notifier};
#[cfg(feature = "smtp")]
pub use smtp::SmtpMailer;
