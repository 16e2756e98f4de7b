use matrimony_auth_types::session::SessionId;

use crate::domain::repository::{OneTimeCodeRepository, SessionRepository, UserRepository};
use crate::domain::types::{AuthMethod, CodePurpose, NewUser, PendingAction, PendingVerification};
use crate::error::AuthServiceError;
use crate::usecase::dispatch::CodeDispatcher;
use crate::usecase::otp::CodeLedger;
use crate::usecase::password::hash_password;
use crate::usecase::session::{SessionIssuer, SignedIn};
use crate::usecase::validation::{normalize_email, validate_email, validate_password};

pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Echo of what is waiting for verification. The password hash stays server-side.
#[derive(Debug)]
pub struct RegisterOutput {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct VerifyRegisterInput {
    pub email: String,
    pub code: String,
}

pub struct RegisterUseCase<U, C, S>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    S: SessionRepository,
{
    pub users: U,
    pub ledger: CodeLedger<C>,
    pub sessions: SessionIssuer<S>,
    pub dispatcher: CodeDispatcher,
    pub hash_cost: u32,
}

impl<U, C, S> RegisterUseCase<U, C, S>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    S: SessionRepository,
{
    /// Step one: park the registration on the session and email a code.
    pub async fn start(
        &self,
        session_id: &SessionId,
        input: RegisterInput,
    ) -> Result<RegisterOutput, AuthServiceError> {
        let email = normalize_email(&input.email);
        validate_email(&email)?;
        validate_password(&input.password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthServiceError::EmailTaken);
        }

        let password_hash = hash_password(&input.password, self.hash_cost).await?;
        let first_name = clean_name(input.first_name);
        let last_name = clean_name(input.last_name);

        let code = self.ledger.issue(&email, CodePurpose::Register).await?;
        // Stored before the send: a reported delivery failure leaves the code redeemable.
        self.sessions
            .begin_pending(
                session_id,
                &email,
                PendingAction::Register {
                    password_hash,
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                },
            )
            .await?;
        self.dispatcher
            .send(&email, &code, CodePurpose::Register)
            .await?;

        Ok(RegisterOutput {
            email,
            first_name,
            last_name,
        })
    }

    /// Step two: redeem the code and create the account from the parked registration.
    pub async fn verify(
        &self,
        session_id: &SessionId,
        input: VerifyRegisterInput,
    ) -> Result<SignedIn, AuthServiceError> {
        let email = normalize_email(&input.email);

        let pending = self.sessions.pending(session_id).await?;
        let (password_hash, first_name, last_name) = match pending {
            Some(PendingVerification {
                email: pending_email,
                action:
                    PendingAction::Register {
                        password_hash,
                        first_name,
                        last_name,
                    },
                ..
            }) if pending_email == email => (password_hash, first_name, last_name),
            _ => return Err(AuthServiceError::InvalidCode),
        };

        self.ledger
            .redeem(&email, &input.code, CodePurpose::Register)
            .await?;

        let user = self
            .users
            .create(NewUser {
                email: Some(email),
                auth: AuthMethod::Password(password_hash),
                first_name,
                last_name,
                profile_image_url: None,
                email_verified: true,
            })
            .await?;
        tracing::info!(user_id = %user.id, "account registered");

        self.sessions.establish(session_id, &user).await
    }
}

fn clean_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty())
}
