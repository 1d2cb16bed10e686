use serde::{Deserialize, Serialize};

use crate::domain::JoinRequest;

pub const SEND_EMAIL_ROUTE: &str = "/api/send-email";

/// Body accepted by [`SEND_EMAIL_ROUTE`]. Field names follow the web form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequestPayload {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<JoinRequestPayload> for JoinRequest {
    fn from(value: JoinRequestPayload) -> Self {
        Self {
            email: value.email,
            instagram_handle: non_blank(value.instagram_handle),
            reason: non_blank(value.reason),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Success body returned by [`SEND_EMAIL_ROUTE`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
