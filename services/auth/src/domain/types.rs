use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use matrimony_auth_types::session::SessionId;

/// Account as seen by the auth core.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub email_verified: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            profile_image_url: self.profile_image_url.clone(),
            is_admin: self.is_admin,
        }
    }
}

/// Sanitized user projection returned to clients. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub is_admin: bool,
}

/// How a new account proves identity. Every account starts with exactly one.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// bcrypt hash of the chosen password.
    Password(String),
    /// Subject id asserted by the federated provider.
    Federated(String),
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Option<String>,
    pub auth: AuthMethod,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub email_verified: bool,
}

/// Partial update. `None` leaves the column untouched; `updated_at` is always stamped.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub email_verified: Option<bool>,
}

/// What a one-time code may be redeemed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodePurpose {
    Login,
    Register,
    Reset,
}

impl CodePurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::Reset => "reset",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "login" => Some(Self::Login),
            "register" => Some(Self::Register),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

/// Issued verification code.
#[derive(Debug, Clone)]
pub struct OneTimeCode {
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub purpose: CodePurpose,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
    pub created_at: DateTime<Utc>,
}

impl OneTimeCode {
    /// Expiry is strict: a code is dead at `expires_at` itself.
    pub fn is_redeemable_at(&self, now: DateTime<Utc>) -> bool {
        !self.consumed && self.expires_at > now
    }
}

/// Rendered email carrying a code.
#[derive(Debug, Clone)]
pub struct CodeMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub code: String,
    pub purpose: CodePurpose,
}

/// Second step a pending session is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Register {
        password_hash: String,
        first_name: Option<String>,
        last_name: Option<String>,
    },
    Login,
}

impl PendingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::Login => "login",
        }
    }
}

/// Short-lived transaction object for two-step flows, keyed by session id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingVerification {
    pub email: String,
    pub action: PendingAction,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A session is in exactly one of these states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Pending(PendingVerification),
    Authenticated(Uuid),
}

/// Identity assertion returned by the federated provider.
#[derive(Debug, Clone)]
pub struct FederatedProfile {
    pub provider_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub picture: Option<String>,
}

/// Redirect target plus the secrets that must survive until the callback.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub csrf_state: String,
    pub pkce_verifier: String,
}

/// Stored CSRF state for an in-flight federated sign-in. Only the session that
/// started the flow may complete it.
#[derive(Debug, Clone)]
pub struct OAuthState {
    pub state: String,
    pub session_id: SessionId,
    pub pkce_verifier: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Digits per one-time code.
pub const CODE_LEN: usize = 6;

/// One-time code time-to-live in seconds (10 minutes).
pub const CODE_TTL_SECS: i64 = 600;

/// Pending verification time-to-live in seconds (same as code TTL).
pub const PENDING_TTL_SECS: i64 = 600;

/// OAuth state time-to-live in seconds.
pub const OAUTH_STATE_TTL_SECS: i64 = 600;

pub const PASSWORD_MIN_LEN: usize = 8;

pub const PASSWORD_MAX_LEN: usize = 128;

/// bcrypt work factor.
pub const DEFAULT_PASSWORD_HASH_COST: u32 = 12;
