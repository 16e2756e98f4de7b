use serde::Deserialize;

use matrimony_auth_types::cookie::{SESSION_TTL_SECS, SessionCookieConfig};
use matrimony_core::config::Config;

use crate::domain::types::DEFAULT_PASSWORD_HASH_COST;
use crate::infra::mailer::SmtpSettings;
use crate::usecase::dispatch::DEFAULT_APP_NAME;

/// Auth service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on. Env var: `AUTH_PORT`.
    #[serde(default = "default_port")]
    pub auth_port: u16,
    /// Apply pending migrations before serving.
    #[serde(default)]
    pub run_migrations: bool,
    /// Cookie domain attribute. Unset keeps the session cookie host-only.
    pub cookie_domain: Option<String>,
    #[serde(default = "default_true")]
    pub cookie_secure: bool,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: i64,
    #[serde(default = "default_hash_cost")]
    pub password_hash_cost: u32,
    /// Brand shown in code emails.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    #[serde(default = "default_google_redirect")]
    pub google_redirect_url: String,

    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from_email: Option<String>,
    pub smtp_from_name: Option<String>,
}

impl Config for AuthConfig {}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_session_ttl() -> i64 {
    SESSION_TTL_SECS
}

fn default_hash_cost() -> u32 {
    DEFAULT_PASSWORD_HASH_COST
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_owned()
}

fn default_google_redirect() -> String {
    "http://localhost:3000/api/auth/google/callback".to_owned()
}

fn default_smtp_port() -> u16 {
    465
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

impl AuthConfig {
    pub fn cookie(&self) -> SessionCookieConfig {
        SessionCookieConfig {
            domain: non_empty(&self.cookie_domain),
            secure: self.cookie_secure,
            ttl_secs: self.session_ttl_secs,
        }
    }

    /// `(client_id, client_secret)` when Google sign-in is configured.
    pub fn google_credentials(&self) -> Option<(String, String)> {
        Some((
            non_empty(&self.google_client_id)?,
            non_empty(&self.google_client_secret)?,
        ))
    }

    /// SMTP settings when host, credentials and sender are all present.
    pub fn smtp(&self) -> Option<SmtpSettings> {
        Some(SmtpSettings {
            host: non_empty(&self.smtp_host)?,
            port: self.smtp_port,
            username: non_empty(&self.smtp_username)?,
            password: non_empty(&self.smtp_password)?,
            from_email: non_empty(&self.smtp_from_email)?,
            from_name: non_empty(&self.smtp_from_name),
        })
    }
}
