use chrono::{DateTime, Duration, Utc};
use rand::RngExt;
use uuid::Uuid;

use crate::domain::repository::OneTimeCodeRepository;
use crate::domain::types::{CODE_TTL_SECS, CodePurpose, OneTimeCode};
use crate::error::AuthServiceError;
use crate::usecase::validation::is_well_formed_code;

/// Uniform over 000000..=999999, zero padded.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    format!("{:06}", rng.random_range(0..1_000_000u32))
}

/// Issues and redeems one-time codes.
///
/// Codes for the same (email, purpose) accumulate; issuing a new one does not revoke
/// earlier ones, and each can be redeemed once before it expires.
pub struct CodeLedger<C>
where
    C: OneTimeCodeRepository,
{
    pub codes: C,
}

impl<C> CodeLedger<C>
where
    C: OneTimeCodeRepository,
{
    pub async fn issue(
        &self,
        email: &str,
        purpose: CodePurpose,
    ) -> Result<String, AuthServiceError> {
        self.issue_at(email, purpose, Utc::now()).await
    }

    pub async fn issue_at(
        &self,
        email: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<String, AuthServiceError> {
        let code = OneTimeCode {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            code: generate_code(),
            purpose,
            expires_at: now + Duration::seconds(CODE_TTL_SECS),
            consumed: false,
            created_at: now,
        };
        self.codes.insert(&code).await?;
        tracing::info!(email, purpose = purpose.as_str(), "one-time code issued");
        Ok(code.code)
    }

    /// `true` exactly once per issued code, and only before expiry and for the purpose
    /// it was issued for.
    pub async fn verify(
        &self,
        email: &str,
        code: &str,
        purpose: CodePurpose,
    ) -> Result<bool, AuthServiceError> {
        self.verify_at(email, code, purpose, Utc::now()).await
    }

    pub async fn verify_at(
        &self,
        email: &str,
        code: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> Result<bool, AuthServiceError> {
        if !is_well_formed_code(code) {
            return Ok(false);
        }
        let consumed = self.codes.consume(email, code, purpose, now).await?;
        if !consumed {
            tracing::info!(email, purpose = purpose.as_str(), "one-time code rejected");
        }
        Ok(consumed)
    }

    /// `verify` that maps a miss to `InvalidCode`.
    pub async fn redeem(
        &self,
        email: &str,
        code: &str,
        purpose: CodePurpose,
    ) -> Result<(), AuthServiceError> {
        if self.verify(email, code, purpose).await? {
            Ok(())
        } else {
            Err(AuthServiceError::InvalidCode)
        }
    }
}
