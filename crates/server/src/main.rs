use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use join_api::{submit_json, InMemoryQuotaStore, JoinContext, Outcome, QuotaStore};
use mailer::{LogMailer, MailSender, SmtpMailer};
use shared::{domain::ClientIdentity, protocol::SEND_EMAIL_ROUTE};
use tokio::task::JoinHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod settings;

use app_state::AppState;
use settings::{load_settings, MailTransport, Settings};

const MAX_BODY_BYTES: usize = 16 * 1024;
const FORWARDED_FOR: &str = "x-forwarded-for";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings()?;
    let mailer = build_mailer(&settings)?;
    let quota = Arc::new(InMemoryQuotaStore::new(settings.quota_policy()?));
    if settings.quota_sweep_interval_seconds > 0 {
        spawn_quota_sweeper(
            quota.clone(),
            Duration::from_secs(settings.quota_sweep_interval_seconds),
        );
    }

    let join = JoinContext {
        quota,
        mailer,
        routing: settings.routing(),
    };
    let app = build_router(Arc::new(AppState { join }));

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid server_bind '{}'", settings.server_bind))?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_mailer(settings: &Settings) -> anyhow::Result<Arc<dyn MailSender>> {
    match settings.mail_transport {
        MailTransport::Smtp => {
            let mailer = SmtpMailer::new(&settings.smtp_config())
                .context("failed to configure smtp transport")?;
            Ok(Arc::new(mailer))
        }
        MailTransport::Log => {
            warn!("mail_transport is 'log'; join requests will not be delivered");
            Ok(Arc::new(LogMailer))
        }
    }
}

fn spawn_quota_sweeper(store: Arc<dyn QuotaStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = store.sweep_expired(Utc::now()).await;
            if removed > 0 {
                debug!(removed, "evicted expired quota entries");
            }
        }
    })
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(SEND_EMAIL_ROUTE, post(send_email))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn send_email(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let forwarded_for = headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok());
    let identity = ClientIdentity::from_forwarded_for(forwarded_for);
    let outcome = submit_json(&state.join, &identity, &body, Utc::now()).await;
    outcome_response(outcome)
}

fn outcome_response(outcome: Outcome) -> Response {
    let status =
        StatusCode::from_u16(outcome.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match outcome.into_body() {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => (status, Json(error)).into_response(),
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
