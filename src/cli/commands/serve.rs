use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;

use crate::app::{app, AppState};
use crate::config::{AppConfig, EmailConfig};
use crate::database::{DatabaseManager, PgStore};
use crate::services::{Notifier, SmtpMailer};

pub async fn handle(mut config: AppConfig, port: Option<u16>, migrate: bool) -> anyhow::Result<()> {
    config.validate()?;
    if let Some(port) = port {
        config.api.port = port;
    }

    let pool = DatabaseManager::connect(&config.database).await?;
    if migrate {
        DatabaseManager::migrate(&pool).await?;
    }

    let notifier = build_notifier(config.email.as_ref());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.api.port));
    let state = AppState::new(Arc::new(PgStore::new(pool)), notifier, config);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Movie Watchlist API listening on http://{}", addr);

    axum::serve(listener, app(state).into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Mail is optional; without it the API runs and notifications are skipped
fn build_notifier(email: Option<&EmailConfig>) -> Notifier {
    let Some(email) = email else {
        tracing::warn!("EMAIL_HOST/EMAIL_USER not set; email notifications are disabled");
        return Notifier::disabled();
    };

    match SmtpMailer::from_config(email) {
        Ok(mailer) => {
            tracing::info!("Email notifications enabled via {}:{}", email.host, email.port);
            Notifier::new(Arc::new(mailer))
        }
        Err(e) => {
            tracing::warn!("Invalid mail configuration, notifications disabled: {}", e);
            Notifier::disabled()
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
