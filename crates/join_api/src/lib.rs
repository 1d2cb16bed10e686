use std::sync::Arc;

use chrono::{DateTime, Utc};
use mailer::MailSender;
use shared::{
    domain::{ClientIdentity, JoinRequest},
    error::{ApiError, ErrorCode},
    protocol::{JoinRequestPayload, MessageBody},
};
use tracing::{error, info, warn};

mod compose;
mod quota;

pub use compose::{compose_message, is_valid_email, MailRouting, SUBJECT};
pub use quota::{InMemoryQuotaStore, QuotaDecision, QuotaPolicy, QuotaStore, RateLimitEntry};

pub const SENT_MESSAGE: &str = "Email sent successfully";
pub const INVALID_EMAIL_MESSAGE: &str = "Invalid email address";
pub const QUOTA_EXCEEDED_MESSAGE: &str = "Too many requests from this ip. Please try again later.";
pub const DELIVERY_FAILED_MESSAGE: &str = "Failed to send email";

#[derive(Clone)]
pub struct JoinContext {
    pub quota: Arc<dyn QuotaStore>,
    pub mailer: Arc<dyn MailSender>,
    pub routing: MailRouting,
}

/// Terminal result of one submission. None of these are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    InvalidInput,
    QuotaExceeded,
    DeliveryFailed,
}

impl Outcome {
    pub fn status_code(self) -> u16 {
        match self {
            Outcome::Sent => 200,
            Outcome::InvalidInput => 400,
            Outcome::QuotaExceeded => 429,
            Outcome::DeliveryFailed => 500,
        }
    }

    /// Body returned to the submitter. Delivery failures stay generic; the
    /// underlying cause is only logged.
    pub fn into_body(self) -> Result<MessageBody, ApiError> {
        match self {
            Outcome::Sent => Ok(MessageBody::new(SENT_MESSAGE)),
            Outcome::InvalidInput => Err(ApiError::new(
                ErrorCode::Validation,
                INVALID_EMAIL_MESSAGE,
            )),
            Outcome::QuotaExceeded => Err(ApiError::new(
                ErrorCode::RateLimited,
                QUOTA_EXCEEDED_MESSAGE,
            )),
            Outcome::DeliveryFailed => Err(ApiError::new(
                ErrorCode::Delivery,
                DELIVERY_FAILED_MESSAGE,
            )),
        }
    }
}

pub async fn submit(ctx: &JoinContext, identity: &ClientIdentity, request: JoinRequest) -> Outcome {
    submit_at(ctx, identity, request, Utc::now()).await
}

/// Quota is charged before the request is validated, so malformed
/// submissions still count against the identity.
pub async fn submit_at(
    ctx: &JoinContext,
    identity: &ClientIdentity,
    request: JoinRequest,
    now: DateTime<Utc>,
) -> Outcome {
    if !admit(ctx, identity, now).await {
        return Outcome::QuotaExceeded;
    }
    deliver(ctx, identity, request).await
}

/// Like [`submit_at`] for an undecoded request body. A body that is not a
/// JSON join request is rejected as invalid input after the quota check.
pub async fn submit_json(
    ctx: &JoinContext,
    identity: &ClientIdentity,
    body: &[u8],
    now: DateTime<Utc>,
) -> Outcome {
    if !admit(ctx, identity, now).await {
        return Outcome::QuotaExceeded;
    }

    let payload = match serde_json::from_slice::<JoinRequestPayload>(body) {
        Ok(payload) => payload,
        Err(e) => {
            info!(%identity, error = %e, "join request body is not valid json");
            return Outcome::InvalidInput;
        }
    };
    deliver(ctx, identity, payload.into()).await
}

async fn admit(ctx: &JoinContext, identity: &ClientIdentity, now: DateTime<Utc>) -> bool {
    match ctx.quota.check_and_increment(identity, now).await {
        QuotaDecision::Allowed => true,
        QuotaDecision::Denied => {
            warn!(%identity, "join request rejected: quota exceeded");
            false
        }
    }
}

async fn deliver(ctx: &JoinContext, identity: &ClientIdentity, request: JoinRequest) -> Outcome {
    if !is_valid_email(&request.email) {
        info!(%identity, "join request rejected: invalid email");
        return Outcome::InvalidInput;
    }

    let message = compose_message(&ctx.routing, &request);

    if let Err(e) = ctx.mailer.verify().await {
        error!(%identity, error = %e, "mail transport verification failed");
        return Outcome::DeliveryFailed;
    }
    if let Err(e) = ctx.mailer.send(&message).await {
        error!(%identity, error = %e, "failed to send join request email");
        return Outcome::DeliveryFailed;
    }

    info!(%identity, "join request delivered");
    Outcome::Sent
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
