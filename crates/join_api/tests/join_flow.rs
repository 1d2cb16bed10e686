use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use join_api::{
    submit_json, InMemoryQuotaStore, JoinContext, MailRouting, Outcome, QuotaPolicy, QuotaStore,
};
use mailer::{MailError, MailMessage, MailSender};
use shared::domain::ClientIdentity;

#[derive(Default)]
struct Outbox(Mutex<Vec<MailMessage>>);

#[async_trait]
impl MailSender for Outbox {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        self.0.lock().expect("lock").push(message.clone());
        Ok(())
    }
}

#[tokio::test]
async fn web_form_submissions_across_a_window() {
    let outbox = Arc::new(Outbox::default());
    let quota = Arc::new(InMemoryQuotaStore::new(QuotaPolicy::default()));
    let routing = MailRouting {
        from: "noreply@example.org".into(),
        operator_mailbox: "operator@example.org".into(),
    };
    let ctx = JoinContext {
        quota: quota.clone(),
        mailer: outbox.clone(),
        routing,
    };
    let who = ClientIdentity::from_forwarded_for(Some("203.0.113.80, 10.1.1.1"));
    let start = Utc::now();

    let bad = submit_json(&ctx, &who, br#"{"email":"not-an-email"}"#, start).await;
    assert_eq!(bad, Outcome::InvalidInput);

    let form = serde_json::json!({
        "email": "reader@example.com",
        "instagramHandle": "@reader",
        "reason": "Book of the month"
    })
    .to_string();
    for _ in 0..4 {
        let outcome = submit_json(&ctx, &who, form.as_bytes(), start).await;
        assert_eq!(outcome, Outcome::Sent);
    }
    assert_eq!(
        submit_json(&ctx, &who, form.as_bytes(), start).await,
        Outcome::QuotaExceeded
    );

    {
        let sent = outbox.0.lock().expect("lock");
        assert_eq!(sent.len(), 4);
        assert!(sent.iter().all(|m| m.to == "operator@example.org"));
        assert!(sent[0].text.contains("Reason: Book of the month"));
    }

    let next_window = start + Duration::hours(2);
    assert_eq!(quota.sweep_expired(next_window).await, 1);
    assert_eq!(
        submit_json(&ctx, &who, form.as_bytes(), next_window).await,
        Outcome::Sent
    );
}
