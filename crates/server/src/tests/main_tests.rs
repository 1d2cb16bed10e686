use super::*;
use async_trait::async_trait;
use axum::{body, body::Body, http::Request};
use join_api::{MailRouting, QuotaPolicy};
use mailer::{MailError, MailMessage};
use std::sync::Mutex;
use tower::ServiceExt;

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<MailMessage>>,
    fail: bool,
}

#[async_trait]
impl MailSender for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Unavailable("connection refused".into()));
        }
        self.sent.lock().expect("lock").push(message.clone());
        Ok(())
    }
}

fn test_app(mailer: Arc<RecordingMailer>) -> Router {
    let join = JoinContext {
        quota: Arc::new(InMemoryQuotaStore::new(QuotaPolicy::default())),
        mailer,
        routing: MailRouting::default(),
    };
    build_router(Arc::new(AppState { join }))
}

fn join_request(forwarded_for: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::post(SEND_EMAIL_ROUTE).header("content-type", "application/json");
    if let Some(ip) = forwarded_for {
        builder = builder.header(FORWARDED_FOR, ip);
    }
    builder.body(body.into()).expect("request")
}

async fn json_body(response: Response) -> serde_json::Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = test_app(Arc::new(RecordingMailer::default()));
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn valid_request_is_mailed_to_operator() {
    let mailer = Arc::new(RecordingMailer::default());
    let app = test_app(mailer.clone());

    let payload = serde_json::json!({ "email": "a@b.com" }).to_string();
    let response = app
        .oneshot(join_request(Some("203.0.113.9"), payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({ "message": "Email sent successfully" })
    );

    let sent = mailer.sent.lock().expect("lock");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, MailRouting::default().operator_mailbox);
}

#[tokio::test]
async fn invalid_email_returns_bad_request() {
    let mailer = Arc::new(RecordingMailer::default());
    let app = test_app(mailer.clone());

    let payload = serde_json::json!({ "email": "not-an-email" }).to_string();
    let response = app
        .oneshot(join_request(Some("203.0.113.9"), payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Invalid email address");
    assert!(mailer.sent.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn non_json_body_returns_bad_request() {
    let app = test_app(Arc::new(RecordingMailer::default()));
    let response = app
        .oneshot(join_request(None, "email=a@b.com"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sixth_request_from_same_ip_is_rate_limited() {
    let app = test_app(Arc::new(RecordingMailer::default()));
    let payload = serde_json::json!({ "email": "a@b.com" }).to_string();

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(join_request(Some("198.51.100.4, 10.0.0.1"), payload.clone()))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let limited = app
        .clone()
        .oneshot(join_request(Some("198.51.100.4"), payload.clone()))
        .await
        .expect("response");
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        json_body(limited).await["error"],
        "Too many requests from this ip. Please try again later."
    );

    let other_ip = app
        .oneshot(join_request(Some("198.51.100.5"), payload))
        .await
        .expect("response");
    assert_eq!(other_ip.status(), StatusCode::OK);
}

#[tokio::test]
async fn delivery_failure_returns_generic_server_error() {
    let app = test_app(Arc::new(RecordingMailer {
        fail: true,
        ..RecordingMailer::default()
    }));
    let payload = serde_json::json!({ "email": "a@b.com" }).to_string();

    let response = app
        .oneshot(join_request(Some("203.0.113.10"), payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Failed to send email");
    assert_eq!(body["code"], "delivery");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = test_app(Arc::new(RecordingMailer::default()));
    let reason = "x".repeat(MAX_BODY_BYTES + 1);
    let payload = serde_json::json!({ "email": "a@b.com", "reason": reason }).to_string();

    let response = app
        .oneshot(join_request(Some("203.0.113.11"), payload))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn sweeper_evicts_elapsed_windows() {
    let quota = Arc::new(InMemoryQuotaStore::new(QuotaPolicy {
        max_requests: 5,
        window: chrono::Duration::milliseconds(1),
    }));
    quota
        .check_and_increment(&ClientIdentity::unknown(), Utc::now())
        .await;
    assert_eq!(quota.tracked_identities().await, 1);

    let handle = spawn_quota_sweeper(quota.clone(), Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.abort();

    assert_eq!(quota.tracked_identities().await, 0);
}

#[test]
fn log_transport_builds_without_smtp() {
    let settings = Settings {
        mail_transport: MailTransport::Log,
        ..Settings::default()
    };
    build_mailer(&settings).expect("mailer");
}
