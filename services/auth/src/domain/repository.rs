#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use matrimony_auth_types::session::SessionId;

use crate::domain::types::{
    AuthorizationRequest, CodeMessage, CodePurpose, FederatedProfile, NewUser, OAuthState,
    OneTimeCode, PendingVerification, SessionState, User, UserChanges,
};
use crate::error::AuthServiceError;

/// Credential store.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError>;

    async fn find_by_federated_id(&self, google_id: &str)
    -> Result<Option<User>, AuthServiceError>;

    /// Insert a new account. Returns `EmailTaken` when the email is already registered.
    async fn create(&self, user: NewUser) -> Result<User, AuthServiceError>;

    /// Apply `changes` and stamp `updated_at`.
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, AuthServiceError>;
}

/// Ledger storage for one-time codes.
pub trait OneTimeCodeRepository: Send + Sync {
    async fn insert(&self, code: &OneTimeCode) -> Result<(), AuthServiceError>;

    /// Flip one matching, unconsumed, unexpired code to consumed.
    /// Returns `true` only for the caller whose update took effect.
    async fn consume(
        &self,
        email: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<bool, AuthServiceError>;
}

/// Server-side session storage. Errors surface as `AuthServiceError::Session`.
pub trait SessionRepository: Send + Sync {
    async fn load(
        &self,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<SessionState, AuthServiceError>;

    /// Retire `previous` with its pending verification, bind `user` to `session_id` and
    /// append a login log, all in one transaction.
    async fn establish(
        &self,
        previous: &SessionId,
        session_id: &SessionId,
        user: &User,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError>;

    /// Store `pending` for the session and drop any user binding.
    async fn begin_pending(
        &self,
        session_id: &SessionId,
        pending: &PendingVerification,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthServiceError>;

    async fn destroy(&self, session_id: &SessionId) -> Result<(), AuthServiceError>;
}

/// CSRF/PKCE state for federated sign-in.
pub trait OAuthStateRepository: Send + Sync {
    async fn save(&self, state: &OAuthState) -> Result<(), AuthServiceError>;

    /// Remove the state and return its PKCE verifier if it existed, belonged to
    /// `session_id` and had not expired.
    async fn take(
        &self,
        state: &str,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, AuthServiceError>;
}

/// Outbound email transport. Blocking; callers run it on the blocking pool.
pub trait CodeMailer: Send + Sync {
    fn send(&self, message: &CodeMessage) -> anyhow::Result<()>;
}

/// Federated identity provider (authorization-code flow with PKCE).
pub trait IdentityProvider: Send + Sync {
    fn authorization_request(&self) -> AuthorizationRequest;

    /// Exchange the callback code and fetch the user's profile.
    /// Provider-side failures are `FederatedFailed`.
    async fn fetch_profile(
        &self,
        code: &str,
        pkce_verifier: &str,
    ) -> Result<FederatedProfile, AuthServiceError>;
}
