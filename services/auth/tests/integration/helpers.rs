#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use uuid::Uuid;

use matrimony_auth::domain::repository::{
    CodeMailer, IdentityProvider, OAuthStateRepository, OneTimeCodeRepository, SessionRepository,
    UserRepository,
};
use matrimony_auth::domain::types::{
    AuthMethod, AuthorizationRequest, CodeMessage, CodePurpose, FederatedProfile, NewUser,
    OAuthState, OneTimeCode, PendingVerification, SessionState, User, UserChanges,
};
use matrimony_auth::error::AuthServiceError;
use matrimony_auth::state::AppState;
use matrimony_auth::usecase::dispatch::CodeDispatcher;
use matrimony_auth::usecase::otp::CodeLedger;
use matrimony_auth::usecase::session::SessionIssuer;
use matrimony_auth_migration::{Migrator, MigratorTrait};
use matrimony_auth_types::cookie::SessionCookieConfig;
use matrimony_auth_types::session::SessionId;

/// Lowest bcrypt cost; keeps hashing fast in tests.
pub const TEST_HASH_COST: u32 = 4;

pub const TEST_PASSWORD: &str = "correct horse battery";

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        Ok(self.all().into_iter().find(|u| u.id == id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError> {
        Ok(self
            .all()
            .into_iter()
            .find(|u| u.email.as_deref() == Some(email)))
    }

    async fn find_by_federated_id(
        &self,
        google_id: &str,
    ) -> Result<Option<User>, AuthServiceError> {
        Ok(self
            .all()
            .into_iter()
            .find(|u| u.google_id.as_deref() == Some(google_id)))
    }

    async fn create(&self, user: NewUser) -> Result<User, AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        if user.email.is_some() && users.iter().any(|u| u.email == user.email) {
            return Err(AuthServiceError::EmailTaken);
        }
        let (password_hash, google_id) = match user.auth {
            AuthMethod::Password(hash) => (Some(hash), None),
            AuthMethod::Federated(id) => (None, Some(id)),
        };
        let now = Utc::now();
        let created = User {
            id: Uuid::now_v7(),
            email: user.email,
            password_hash,
            google_id,
            first_name: user.first_name,
            last_name: user.last_name,
            profile_image_url: user.profile_image_url,
            email_verified: user.email_verified,
            is_admin: false,
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| anyhow::anyhow!("user {id} not found"))?;
        if let Some(hash) = changes.password_hash {
            user.password_hash = Some(hash);
        }
        if let Some(google_id) = changes.google_id {
            user.google_id = Some(google_id);
        }
        if let Some(verified) = changes.email_verified {
            user.email_verified = verified;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

// ── MockCodeRepo ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockCodeRepo {
    pub codes: Arc<Mutex<Vec<OneTimeCode>>>,
}

impl MockCodeRepo {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<OneTimeCode> {
        self.codes.lock().unwrap().clone()
    }

    /// Most recently issued code for `email` and `purpose`.
    pub fn latest(&self, email: &str, purpose: CodePurpose) -> Option<String> {
        self.all()
            .into_iter()
            .rev()
            .find(|c| c.email == email && c.purpose == purpose)
            .map(|c| c.code)
    }
}

impl OneTimeCodeRepository for MockCodeRepo {
    async fn insert(&self, code: &OneTimeCode) -> Result<(), AuthServiceError> {
        self.codes.lock().unwrap().push(code.clone());
        Ok(())
    }

    async fn consume(
        &self,
        email: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<bool, AuthServiceError> {
        let mut codes = self.codes.lock().unwrap();
        let found = codes.iter_mut().find(|c| {
            c.email == email && c.code == code && c.purpose == purpose && c.is_redeemable_at(now)
        });
        Ok(match found {
            Some(c) => {
                c.consumed = true;
                true
            }
            None => false,
        })
    }
}

// ── MockSessionRepo ──────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockSessionRepo {
    pub states: Arc<Mutex<HashMap<String, SessionState>>>,
    /// User ids in the order their logins were recorded.
    pub logins: Arc<Mutex<Vec<Uuid>>>,
}

impl MockSessionRepo {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn state_of(&self, session_id: &SessionId) -> SessionState {
        self.states
            .lock()
            .unwrap()
            .get(session_id.as_str())
            .cloned()
            .unwrap_or(SessionState::Anonymous)
    }

    pub fn logins(&self) -> Vec<Uuid> {
        self.logins.lock().unwrap().clone()
    }
}

impl SessionRepository for MockSessionRepo {
    async fn load(
        &self,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<SessionState, AuthServiceError> {
        Ok(match self.state_of(session_id) {
            SessionState::Pending(p) if p.expires_at <= now => SessionState::Anonymous,
            state => state,
        })
    }

    async fn establish(
        &self,
        previous: &SessionId,
        session_id: &SessionId,
        user: &User,
        _expires_at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        let mut states = self.states.lock().unwrap();
        states.remove(previous.as_str());
        states.insert(
            session_id.as_str().to_owned(),
            SessionState::Authenticated(user.id),
        );
        drop(states);
        self.logins.lock().unwrap().push(user.id);
        Ok(())
    }

    async fn begin_pending(
        &self,
        session_id: &SessionId,
        pending: &PendingVerification,
        _expires_at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError> {
        self.states.lock().unwrap().insert(
            session_id.as_str().to_owned(),
            SessionState::Pending(pending.clone()),
        );
        Ok(())
    }

    async fn destroy(&self, session_id: &SessionId) -> Result<(), AuthServiceError> {
        self.states.lock().unwrap().remove(session_id.as_str());
        Ok(())
    }
}

// ── MockOAuthStateRepo ───────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockOAuthStateRepo {
    pub states: Arc<Mutex<Vec<OAuthState>>>,
}

impl OAuthStateRepository for MockOAuthStateRepo {
    async fn save(&self, state: &OAuthState) -> Result<(), AuthServiceError> {
        self.states.lock().unwrap().push(state.clone());
        Ok(())
    }

    async fn take(
        &self,
        state: &str,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, AuthServiceError> {
        let mut states = self.states.lock().unwrap();
        let Some(index) = states
            .iter()
            .position(|s| s.state == state && &s.session_id == session_id)
        else {
            return Ok(None);
        };
        let taken = states.remove(index);
        Ok((taken.expires_at > now).then_some(taken.pkce_verifier))
    }
}

// ── Mailers ──────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<CodeMessage>>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<CodeMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl CodeMailer for RecordingMailer {
    fn send(&self, message: &CodeMessage) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct FailingMailer;

impl CodeMailer for FailingMailer {
    fn send(&self, _message: &CodeMessage) -> anyhow::Result<()> {
        anyhow::bail!("smtp relay refused connection")
    }
}

pub fn dispatcher(mailer: Arc<dyn CodeMailer>) -> CodeDispatcher {
    CodeDispatcher {
        mailer,
        app_name: "NRI Christian Matrimony".to_owned(),
    }
}

// ── MockProvider ─────────────────────────────────────────────────────────────

/// Identity provider that returns a fixed profile, or fails when there is none.
#[derive(Clone, Default)]
pub struct MockProvider {
    pub profile: Option<FederatedProfile>,
    /// `(code, pkce_verifier)` pairs seen by `fetch_profile`.
    pub exchanges: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockProvider {
    pub fn returning(profile: FederatedProfile) -> Self {
        Self {
            profile: Some(profile),
            ..Self::default()
        }
    }
}

impl IdentityProvider for MockProvider {
    fn authorization_request(&self) -> AuthorizationRequest {
        let csrf_state = Uuid::new_v4().to_string();
        AuthorizationRequest {
            url: format!("https://accounts.example.test/auth?state={csrf_state}"),
            csrf_state,
            pkce_verifier: "test-pkce-verifier".to_owned(),
        }
    }

    async fn fetch_profile(
        &self,
        code: &str,
        pkce_verifier: &str,
    ) -> Result<FederatedProfile, AuthServiceError> {
        self.exchanges
            .lock()
            .unwrap()
            .push((code.to_owned(), pkce_verifier.to_owned()));
        self.profile.clone().ok_or_else(|| {
            AuthServiceError::FederatedFailed(anyhow::anyhow!("token exchange rejected"))
        })
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn ledger(codes: &MockCodeRepo) -> CodeLedger<MockCodeRepo> {
    CodeLedger {
        codes: codes.clone(),
    }
}

pub fn issuer(sessions: &MockSessionRepo) -> SessionIssuer<MockSessionRepo> {
    SessionIssuer {
        sessions: sessions.clone(),
        ttl_secs: 604_800,
    }
}

pub fn password_user(email: &str, password: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::now_v7(),
        email: Some(email.to_owned()),
        password_hash: Some(bcrypt::hash(password, TEST_HASH_COST).unwrap()),
        google_id: None,
        first_name: Some("Anna".to_owned()),
        last_name: Some("Thomas".to_owned()),
        profile_image_url: None,
        email_verified: true,
        is_admin: false,
        created_at: now,
        updated_at: now,
    }
}

pub fn google_user(email: Option<&str>, google_id: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::now_v7(),
        email: email.map(str::to_owned),
        password_hash: None,
        google_id: Some(google_id.to_owned()),
        first_name: Some("Mathew".to_owned()),
        last_name: Some("Kurian".to_owned()),
        profile_image_url: None,
        email_verified: true,
        is_admin: false,
        created_at: now,
        updated_at: now,
    }
}

pub fn profile(provider_id: &str, email: Option<&str>) -> FederatedProfile {
    FederatedProfile {
        provider_id: provider_id.to_owned(),
        email: email.map(str::to_owned),
        first_name: Some("Mathew".to_owned()),
        last_name: Some("Kurian".to_owned()),
        picture: Some("https://lh3.example.test/photo.jpg".to_owned()),
    }
}

// ── Database ─────────────────────────────────────────────────────────────────

/// Fresh in-memory SQLite database with all migrations applied.
pub async fn test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // Every pooled connection would otherwise get its own empty database.
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn test_state(db: DatabaseConnection, mailer: Arc<dyn CodeMailer>) -> AppState {
    AppState {
        db,
        dispatcher: dispatcher(mailer),
        google: None,
        cookie: SessionCookieConfig {
            domain: None,
            secure: false,
            ttl_secs: 604_800,
        },
        password_hash_cost: TEST_HASH_COST,
    }
}
