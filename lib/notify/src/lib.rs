//! Outbound notifications — email and Slack side effects of workflow
//! transitions.
//!
//! Everything here is fire-and-forget: a notification failure is logged
//! and never propagated back into the transition that triggered it.
//! Module services hold an `Arc<dyn Notifier>`; the concrete
//! implementation is injected at startup time.

pub mod error;
pub mod mail;
pub mod notifier;
pub mod slack;

pub use error::NotifyError;
pub use mail::{EmailMessage, MailConfig};
pub use notifier::{
    Dispatcher, DispatcherConfig, Notification, Notifier, NullNotifier, RecordingNotifier,
    finance_email,
};
pub use slack::SlackConfig;
