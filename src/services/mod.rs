pub mod notification_service;

pub use notification_service::{
    classify_update, Mailer, MailError, Notifier, OutgoingEmail, RecordingMailer, SmtpMailer, WatchlistAction,
};
