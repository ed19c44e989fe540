use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::EmailConfig;
use crate::database::models::{Movie, User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    Address(String),
    #[error("Failed to build message: {0}")]
    Build(String),
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Outbound mail transport
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// SMTP delivery through lettre's tokio transport
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &EmailConfig) -> Result<Self, MailError> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());

        let transport = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| MailError::Transport(e.to_string()))?
                .port(config.port)
                .credentials(creds)
                .build()
        } else {
            // Upgrade with STARTTLS when the server offers it
            let tls = TlsParameters::new(config.host.clone()).map_err(|e| MailError::Transport(e.to_string()))?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .port(config.port)
                .tls(Tls::Opportunistic(tls))
                .credentials(creds)
                .build()
        };

        let from = config
            .from_address
            .parse::<Mailbox>()
            .map_err(|e| MailError::Address(e.to_string()))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let to = email.to.parse::<Mailbox>().map_err(|e| MailError::Address(e.to_string()))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        Ok(())
    }
}

/// Captures outgoing mail on a channel instead of delivering it
pub struct RecordingMailer {
    sender: mpsc::UnboundedSender<OutgoingEmail>,
}

impl RecordingMailer {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutgoingEmail>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        self.sender
            .send(email)
            .map_err(|_| MailError::Transport("recording channel closed".to_string()))
    }
}

/// Kind of watchlist change being announced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchlistAction {
    Added,
    StatusChanged,
    Rated,
    Updated,
}

impl WatchlistAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchlistAction::Added => "added",
            WatchlistAction::StatusChanged => "status_changed",
            WatchlistAction::Rated => "rated",
            WatchlistAction::Updated => "updated",
        }
    }
}

/// Status changes win over rating changes, which win over any other edit
pub fn classify_update(before: &Movie, after: &Movie) -> WatchlistAction {
    if before.watch_status != after.watch_status {
        WatchlistAction::StatusChanged
    } else if before.rating != after.rating {
        WatchlistAction::Rated
    } else {
        WatchlistAction::Updated
    }
}

/// Best-effort email notifications. Delivery runs on a detached task and
/// failures are only logged.
#[derive(Clone)]
pub struct Notifier {
    mailer: Option<Arc<dyn Mailer>>,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer: Some(mailer) }
    }

    /// Notifications are skipped entirely
    pub fn disabled() -> Self {
        Self { mailer: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }

    /// Sent on registration regardless of the notification preference
    pub fn welcome(&self, user: &User) {
        self.dispatch(welcome_email(user), "welcome");
    }

    pub fn watchlist_update(&self, user: &User, movie: &Movie, action: WatchlistAction) {
        if !user.email_notifications {
            return;
        }
        self.dispatch(watchlist_email(user, movie, action), action.as_str());
    }

    fn dispatch(&self, email: OutgoingEmail, kind: &'static str) {
        let Some(mailer) = self.mailer.clone() else {
            tracing::debug!("Mail transport not configured; skipping {} email", kind);
            return;
        };

        tokio::spawn(async move {
            let to = email.to.clone();
            match mailer.send(email).await {
                Ok(()) => tracing::info!("Sent {} email to {}", kind, to),
                Err(e) => tracing::error!("Error sending {} email to {}: {}", kind, to, e),
            }
        });
    }
}

pub fn welcome_email(user: &User) -> OutgoingEmail {
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #333;">Welcome to Movie Watchlist!</h2>
  <p>Hi {name},</p>
  <p>Welcome to your personal movie tracking experience! You can now:</p>
  <ul>
    <li>Add movies to your watchlist</li>
    <li>Track your watching progress</li>
    <li>Rate and review movies</li>
    <li>Filter by genre and status</li>
  </ul>
  <p>Start building your movie collection today!</p>
  <p>Best regards,<br>Movie Watchlist Team</p>
</div>"#,
        name = escape_html(&user.name)
    );

    OutgoingEmail {
        to: user.email.clone(),
        subject: "Welcome to Movie Watchlist!".to_string(),
        html,
    }
}

pub fn watchlist_email(user: &User, movie: &Movie, action: WatchlistAction) -> OutgoingEmail {
    let title = escape_html(&movie.title);
    let status = movie.watch_status.label();

    let message = match action {
        WatchlistAction::Added => format!("You've added \"{}\" to your watchlist!", title),
        WatchlistAction::StatusChanged => format!("You've updated the status of \"{}\" to \"{}\"", title, status),
        WatchlistAction::Rated => match movie.rating {
            Some(rating) => format!("You've rated \"{}\" {}/10", title, rating),
            None => format!("You've cleared the rating of \"{}\"", title),
        },
        WatchlistAction::Updated => format!("Your movie \"{}\" has been updated", title),
    };

    let rating_line = movie
        .rating
        .map(|r| format!("\n    <p><strong>Rating:</strong> {}/10</p>", r))
        .unwrap_or_default();
    let notes_line = movie
        .personal_notes
        .as_deref()
        .filter(|n| !n.is_empty())
        .map(|n| format!("\n    <p><strong>Notes:</strong> {}</p>", escape_html(n)))
        .unwrap_or_default();

    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #333;">Movie Watchlist Update</h2>
  <p>Hi {name},</p>
  <p>{message}</p>
  <div style="background-color: #f5f5f5; padding: 15px; border-radius: 5px; margin: 20px 0;">
    <h3 style="margin: 0 0 10px 0; color: #555;">Movie Details:</h3>
    <p><strong>Title:</strong> {title}</p>
    <p><strong>Genre:</strong> {genre}</p>
    <p><strong>Status:</strong> {status}</p>{rating_line}{notes_line}
  </div>
  <p>Happy watching!</p>
  <p>Your Movie Watchlist Team</p>
</div>"#,
        name = escape_html(&user.name),
        message = message,
        title = title,
        genre = movie.genre,
        status = status,
        rating_line = rating_line,
        notes_line = notes_line,
    );

    OutgoingEmail {
        to: user.email.clone(),
        subject: format!("Movie Watchlist Update - {}", movie.title),
        html,
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
