use chrono::{Duration, Utc};
use uuid::Uuid;

use matrimony_auth_types::session::SessionId;

use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::types::{
    PENDING_TTL_SECS, PendingAction, PendingVerification, SessionState, User, UserView,
};
use crate::error::AuthServiceError;

/// A freshly authenticated user and the session id the client must switch to.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: User,
    pub session_id: SessionId,
}

/// Binds and clears server-side sessions and holds pending two-step state.
pub struct SessionIssuer<S>
where
    S: SessionRepository,
{
    pub sessions: S,
    pub ttl_secs: i64,
}

impl<S> SessionIssuer<S>
where
    S: SessionRepository,
{
    /// Authenticate `user` under a newly minted session id. The `previous` session and
    /// any pending verification it held are discarded.
    pub async fn establish(
        &self,
        previous: &SessionId,
        user: &User,
    ) -> Result<SignedIn, AuthServiceError> {
        let session_id = SessionId::generate();
        let expires_at = Utc::now() + Duration::seconds(self.ttl_secs);
        self.sessions
            .establish(previous, &session_id, user, expires_at)
            .await?;
        tracing::info!(user_id = %user.id, "session established");
        Ok(SignedIn {
            user: user.clone(),
            session_id,
        })
    }

    pub async fn clear(&self, session_id: &SessionId) -> Result<(), AuthServiceError> {
        self.sessions.destroy(session_id).await
    }

    /// Record that the session is waiting for `email` to prove a code. Demotes an
    /// authenticated session back to unauthenticated.
    pub async fn begin_pending(
        &self,
        session_id: &SessionId,
        email: &str,
        action: PendingAction,
    ) -> Result<(), AuthServiceError> {
        let now = Utc::now();
        let pending = PendingVerification {
            email: email.to_owned(),
            action,
            expires_at: now + Duration::seconds(PENDING_TTL_SECS),
            created_at: now,
        };
        let session_expires_at = now + Duration::seconds(self.ttl_secs);
        self.sessions
            .begin_pending(session_id, &pending, session_expires_at)
            .await
    }

    pub async fn pending(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<PendingVerification>, AuthServiceError> {
        match self.sessions.load(session_id, Utc::now()).await? {
            SessionState::Pending(pending) => Ok(Some(pending)),
            _ => Ok(None),
        }
    }

    pub async fn authenticated_user_id(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<Uuid>, AuthServiceError> {
        match self.sessions.load(session_id, Utc::now()).await? {
            SessionState::Authenticated(user_id) => Ok(Some(user_id)),
            _ => Ok(None),
        }
    }
}

pub struct CurrentUserUseCase<S, U>
where
    S: SessionRepository,
    U: UserRepository,
{
    pub sessions: SessionIssuer<S>,
    pub users: U,
}

impl<S, U> CurrentUserUseCase<S, U>
where
    S: SessionRepository,
    U: UserRepository,
{
    /// Sanitized view of the authenticated user, or `Unauthorized`.
    pub async fn execute(&self, session_id: &SessionId) -> Result<UserView, AuthServiceError> {
        let user_id = self
            .sessions
            .authenticated_user_id(session_id)
            .await?
            .ok_or(AuthServiceError::Unauthorized)?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::Unauthorized)?;
        Ok(user.view())
    }
}
