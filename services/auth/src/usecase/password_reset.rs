use crate::domain::repository::{OneTimeCodeRepository, UserRepository};
use crate::domain::types::{CodePurpose, UserChanges};
use crate::error::AuthServiceError;
use crate::usecase::dispatch::CodeDispatcher;
use crate::usecase::otp::CodeLedger;
use crate::usecase::password::hash_password;
use crate::usecase::validation::{normalize_email, validate_email, validate_password};

pub struct ResetPasswordInput {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

pub struct PasswordResetUseCase<U, C>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
{
    pub users: U,
    pub ledger: CodeLedger<C>,
    pub dispatcher: CodeDispatcher,
    pub hash_cost: u32,
}

impl<U, C> PasswordResetUseCase<U, C>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
{
    /// Send a reset code if the account exists. The outcome is the same either way so
    /// callers cannot enumerate registered addresses.
    ///
    /// Unlike registration and code login, a `Delivery` failure here is logged and not
    /// returned: an error for known addresses only would reveal which accounts exist.
    pub async fn request(&self, email: &str) -> Result<(), AuthServiceError> {
        let email = normalize_email(email);
        validate_email(&email)?;

        let Some(user) = self.users.find_by_email(&email).await? else {
            tracing::info!("password reset requested for unknown email");
            return Ok(());
        };

        let code = self.ledger.issue(&email, CodePurpose::Reset).await?;
        match self.dispatcher.send(&email, &code, CodePurpose::Reset).await {
            Ok(()) => Ok(()),
            Err(AuthServiceError::Delivery(e)) => {
                tracing::error!(
                    user_id = %user.id,
                    error = %format!("{e:#}"),
                    "reset code delivery failed"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// The new password is checked before the code so a weak choice does not burn it.
    pub async fn reset(&self, input: ResetPasswordInput) -> Result<(), AuthServiceError> {
        validate_password(&input.new_password)?;
        let email = normalize_email(&input.email);

        self.ledger
            .redeem(&email, &input.code, CodePurpose::Reset)
            .await?;
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthServiceError::InvalidCode)?;

        let password_hash = hash_password(&input.new_password, self.hash_cost).await?;
        self.users
            .update(
                user.id,
                UserChanges {
                    password_hash: Some(password_hash),
                    ..UserChanges::default()
                },
            )
            .await?;
        tracing::info!(user_id = %user.id, "password reset");
        Ok(())
    }
}
