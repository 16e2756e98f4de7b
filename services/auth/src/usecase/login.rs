use matrimony_auth_types::session::SessionId;

use crate::domain::repository::{OneTimeCodeRepository, SessionRepository, UserRepository};
use crate::domain::types::{CodePurpose, PendingAction};
use crate::error::AuthServiceError;
use crate::usecase::dispatch::CodeDispatcher;
use crate::usecase::otp::CodeLedger;
use crate::usecase::password::verify_password;
use crate::usecase::session::{SessionIssuer, SignedIn};
use crate::usecase::validation::{normalize_email, validate_email};

// ── Password login ────────────────────────────────────────────────────────────

pub struct PasswordLoginInput {
    pub email: String,
    pub password: String,
}

pub struct PasswordLoginUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub users: U,
    pub sessions: SessionIssuer<S>,
}

impl<U, S> PasswordLoginUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    /// Unknown email, password-less account and wrong password are indistinguishable.
    pub async fn execute(
        &self,
        session_id: &SessionId,
        input: PasswordLoginInput,
    ) -> Result<SignedIn, AuthServiceError> {
        let email = normalize_email(&input.email);

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthServiceError::InvalidCredentials)?;
        if !verify_password(&input.password, hash).await? {
            tracing::info!(user_id = %user.id, "password login rejected");
            return Err(AuthServiceError::InvalidCredentials);
        }

        self.sessions.establish(session_id, &user).await
    }
}

// ── Code login ────────────────────────────────────────────────────────────────

pub struct CodeLoginInput {
    pub email: String,
    pub code: String,
}

pub struct CodeLoginUseCase<U, C, S>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    S: SessionRepository,
{
    pub users: U,
    pub ledger: CodeLedger<C>,
    pub sessions: SessionIssuer<S>,
    pub dispatcher: CodeDispatcher,
}

impl<U, C, S> CodeLoginUseCase<U, C, S>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    S: SessionRepository,
{
    pub async fn start(
        &self,
        session_id: &SessionId,
        email: &str,
    ) -> Result<(), AuthServiceError> {
        let email = normalize_email(email);
        validate_email(&email)?;

        self.users
            .find_by_email(&email)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        let code = self.ledger.issue(&email, CodePurpose::Login).await?;
        self.sessions
            .begin_pending(session_id, &email, PendingAction::Login)
            .await?;
        self.dispatcher.send(&email, &code, CodePurpose::Login).await
    }

    pub async fn verify(
        &self,
        session_id: &SessionId,
        input: CodeLoginInput,
    ) -> Result<SignedIn, AuthServiceError> {
        let email = normalize_email(&input.email);

        self.ledger
            .redeem(&email, &input.code, CodePurpose::Login)
            .await?;
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        self.sessions.establish(session_id, &user).await
    }
}
