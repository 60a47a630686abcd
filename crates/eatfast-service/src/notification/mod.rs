//! Notification sender: account emails for codes, reset links and notices.

pub mod dispatcher;
pub mod message;
pub mod sender;

pub use dispatcher::NotificationDispatcher;
pub use message::Notification;
pub use sender::{LogNotifier, Notifier, RecordingNotifier, SmtpNotifier};
