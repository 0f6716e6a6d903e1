//! Gateway webhook handlers.

mod process_notification;

pub use process_notification::{NotificationOutcome, ProcessNotificationHandler};
