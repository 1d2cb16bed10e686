use std::path::Path;

use anyhow::{bail, Context};
use chrono::Duration;
use config::{Config, Environment, File};
use join_api::{MailRouting, QuotaPolicy};
use mailer::SmtpConfig;
use serde::Deserialize;
use tracing::warn;

const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransport {
    Smtp,
    Log,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server_bind: String,
    pub mail_transport: MailTransport,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_secure: bool,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub mail_from: String,
    pub operator_mailbox: String,
    pub quota_max_requests: u32,
    pub quota_window_seconds: i64,
    /// Zero disables the background sweep of expired quota entries.
    pub quota_sweep_interval_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let smtp = SmtpConfig::default();
        let routing = MailRouting::default();
        Self {
            server_bind: "127.0.0.1:3000".into(),
            mail_transport: MailTransport::Smtp,
            smtp_host: smtp.host,
            smtp_port: smtp.port,
            smtp_secure: smtp.secure,
            smtp_user: smtp.username,
            smtp_pass: smtp.password,
            mail_from: routing.from,
            operator_mailbox: routing.operator_mailbox,
            quota_max_requests: 5,
            quota_window_seconds: 60 * 60,
            quota_sweep_interval_seconds: 600,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.quota_max_requests == 0 {
            bail!("quota_max_requests must be at least 1");
        }
        if self.quota_window_seconds <= 0 {
            bail!("quota_window_seconds must be positive");
        }
        self.quota_policy()?;
        if self.operator_mailbox.trim().is_empty() {
            bail!("operator_mailbox must be set");
        }
        Ok(())
    }

    pub fn smtp_config(&self) -> SmtpConfig {
        SmtpConfig {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            secure: self.smtp_secure,
            username: self.smtp_user.clone(),
            password: self.smtp_pass.clone(),
        }
    }

    pub fn routing(&self) -> MailRouting {
        MailRouting {
            from: self.mail_from.clone(),
            operator_mailbox: self.operator_mailbox.clone(),
        }
    }

    pub fn quota_policy(&self) -> anyhow::Result<QuotaPolicy> {
        let Some(window) = Duration::try_seconds(self.quota_window_seconds) else {
            bail!("quota_window_seconds is out of range");
        };
        Ok(QuotaPolicy {
            max_requests: self.quota_max_requests,
            window,
        })
    }
}

/// Defaults, then `server.toml`, then `APP__*` variables, then the plain
/// variables older deployments set (`SMTP_HOST`, `SERVER_BIND`, ...).
pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = load_layered(Path::new(SETTINGS_FILE))?;
    apply_legacy_env(&mut settings, |key| std::env::var(key).ok());
    settings.validate()?;
    Ok(settings)
}

fn load_layered(file: &Path) -> anyhow::Result<Settings> {
    Config::builder()
        .add_source(File::from(file).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(|config| config.try_deserialize::<Settings>())
        .with_context(|| format!("failed to load settings from '{}'", file.display()))
}

fn apply_legacy_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = var("SMTP_HOST") {
        settings.smtp_host = v;
    }
    if let Some(v) = var("SMTP_PORT") {
        match v.parse::<u16>() {
            Ok(port) => settings.smtp_port = port,
            Err(e) => warn!(value = %v, error = %e, "ignoring invalid SMTP_PORT"),
        }
    }
    if let Some(v) = var("SMTP_SECURE") {
        settings.smtp_secure = v == "true";
    }
    if let Some(v) = var("SMTP_USER") {
        settings.smtp_user = v;
    }
    if let Some(v) = var("SMTP_PASS") {
        settings.smtp_pass = v;
    }
    if let Some(v) = var("SMTP_FROM") {
        settings.mail_from = v;
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
