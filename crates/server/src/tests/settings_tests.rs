use super::*;

use std::{
    collections::HashMap,
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_settings_file(contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("glia_server_settings_test_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("server.toml");
    fs::write(&path, contents).expect("write settings");
    path
}

#[test]
fn defaults_match_production_deployment() {
    let settings = Settings::default();
    assert_eq!(settings.smtp_host, "smtp.gmail.com");
    assert_eq!(settings.smtp_port, 587);
    assert!(!settings.smtp_secure);
    assert_eq!(settings.mail_from, "noreply@glia.com");
    assert_eq!(settings.quota_policy().expect("policy"), QuotaPolicy::default());
    settings.validate().expect("defaults are valid");
}

#[test]
fn missing_settings_file_falls_back_to_defaults() {
    let settings =
        load_layered(Path::new("definitely/not/here/server.toml")).expect("settings");
    assert_eq!(settings.quota_max_requests, 5);
    assert_eq!(settings.mail_transport, MailTransport::Smtp);
}

#[test]
fn settings_file_overrides_defaults() {
    let path = temp_settings_file(
        r#"
server_bind = "0.0.0.0:8080"
mail_transport = "log"
operator_mailbox = "club@example.org"
quota_max_requests = 3
quota_window_seconds = 120
"#,
    );

    let settings = load_layered(&path).expect("settings");
    assert_eq!(settings.server_bind, "0.0.0.0:8080");
    assert_eq!(settings.mail_transport, MailTransport::Log);
    assert_eq!(settings.routing().operator_mailbox, "club@example.org");
    let policy = settings.quota_policy().expect("policy");
    assert_eq!(policy.max_requests, 3);
    assert_eq!(policy.window, Duration::seconds(120));
    assert_eq!(settings.smtp_port, 587);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn legacy_smtp_variables_take_precedence() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("SMTP_HOST", "mail.example.org"),
        ("SMTP_PORT", "465"),
        ("SMTP_SECURE", "true"),
        ("SMTP_USER", "mailer"),
        ("SMTP_PASS", "hunter2"),
        ("SMTP_FROM", "club@example.org"),
        ("SERVER_BIND", "0.0.0.0:9000"),
    ]);
    let mut settings = Settings::default();
    apply_legacy_env(&mut settings, |key| vars.get(key).map(|v| v.to_string()));

    let smtp = settings.smtp_config();
    assert_eq!(smtp.host, "mail.example.org");
    assert_eq!(smtp.port, 465);
    assert!(smtp.secure);
    assert_eq!(smtp.username, "mailer");
    assert_eq!(smtp.password, "hunter2");
    assert_eq!(settings.routing().from, "club@example.org");
    assert_eq!(settings.server_bind, "0.0.0.0:9000");
}

#[test]
fn invalid_legacy_port_is_ignored() {
    let mut settings = Settings::default();
    apply_legacy_env(&mut settings, |key| {
        (key == "SMTP_PORT").then(|| "not-a-port".to_string())
    });
    assert_eq!(settings.smtp_port, 587);
}

#[test]
fn rejects_unusable_quota() {
    let settings = Settings {
        quota_max_requests: 0,
        ..Settings::default()
    };
    assert!(settings.validate().is_err());

    let settings = Settings {
        quota_window_seconds: 0,
        ..Settings::default()
    };
    assert!(settings.validate().is_err());

    let settings = Settings {
        quota_window_seconds: i64::MAX,
        ..Settings::default()
    };
    assert!(settings.validate().is_err());
    assert!(settings.quota_policy().is_err());
}
