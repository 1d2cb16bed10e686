use std::sync::LazyLock;

use mailer::MailMessage;
use regex::Regex;
use shared::domain::JoinRequest;

pub const SUBJECT: &str = "Glia Request";
const MISSING_FIELD: &str = "N/A";

/// Sender and recipient of the notification sent for each join request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailRouting {
    pub from: String,
    pub operator_mailbox: String,
}

impl Default for MailRouting {
    fn default() -> Self {
        Self {
            from: "noreply@glia.com".into(),
            operator_mailbox: "contact@glia.com".into(),
        }
    }
}

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(EMAIL_PATTERN).ok());

/// Permissive `local@domain.tld` check: no whitespace, exactly one `@`, and a
/// dot in the domain with something on both sides of it.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email))
}

pub fn compose_message(routing: &MailRouting, request: &JoinRequest) -> MailMessage {
    let email = request.email.as_str();
    let handle = request.instagram_handle.as_deref().unwrap_or(MISSING_FIELD);
    let reason = request.reason.as_deref().unwrap_or(MISSING_FIELD);

    let text = format!(
        "New request to join Glia from: {email}\nInstagram Handle: {handle}\nReason: {reason}"
    );
    let html = format!(
        "<h2>New Glia Request</h2>\n\
         <p>A new user has requested to join Glia.</p>\n\
         <p><strong>Email:</strong> {}</p>\n\
         <p><strong>Instagram Handle:</strong> {}</p>\n\
         <p><strong>Reason for Joining:</strong></p>\n\
         <p>{}</p>\n",
        escape_html(email),
        escape_html(handle),
        escape_html(reason),
    );

    MailMessage {
        from: routing.from.clone(),
        to: routing.operator_mailbox.clone(),
        subject: SUBJECT.to_string(),
        text,
        html,
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
#[path = "tests/compose_tests.rs"]
mod tests;
