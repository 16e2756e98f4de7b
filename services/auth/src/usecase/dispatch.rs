use std::sync::Arc;

use crate::domain::repository::CodeMailer;
use crate::domain::types::{CODE_TTL_SECS, CodeMessage, CodePurpose};
use crate::error::AuthServiceError;

pub const DEFAULT_APP_NAME: &str = "NRI Christian Matrimony";

const CODE_STYLE: &str = "font-size: 32px; letter-spacing: 5px; color: #1e3a5f;";

/// Renders per-purpose code emails and hands them to the mail transport.
#[derive(Clone)]
pub struct CodeDispatcher {
    pub mailer: Arc<dyn CodeMailer>,
    pub app_name: String,
}

impl CodeDispatcher {
    pub fn compose(&self, email: &str, code: &str, purpose: CodePurpose) -> CodeMessage {
        let minutes = CODE_TTL_SECS / 60;
        let app = &self.app_name;
        let expiry = format!("<p>This code will expire in {minutes} minutes.</p>");
        let code_block = format!("<h1 style=\"{CODE_STYLE}\">{code}</h1>");
        let (subject, html) = match purpose {
            CodePurpose::Login => (
                "Your Login Verification Code",
                format!(
                    "<h2>Your Verification Code</h2>\
                     <p>Your verification code for {app} is:</p>{code_block}{expiry}"
                ),
            ),
            CodePurpose::Register => (
                "Verify Your Email Address",
                format!(
                    "<h2>Welcome to {app}!</h2><p>Your verification code is:</p>{code_block}{expiry}"
                ),
            ),
            CodePurpose::Reset => (
                "Password Reset Code",
                format!(
                    "<h2>Password Reset</h2>\
                     <p>Your password reset code for {app} is:</p>{code_block}{expiry}\
                     <p><em>If you did not request this, please ignore this email.</em></p>"
                ),
            ),
        };
        CodeMessage {
            to: email.to_owned(),
            subject: subject.to_owned(),
            html,
            code: code.to_owned(),
            purpose,
        }
    }

    /// Deliver `code`. A failure leaves the issued code valid and surfaces as `Delivery`.
    pub async fn send(
        &self,
        email: &str,
        code: &str,
        purpose: CodePurpose,
    ) -> Result<(), AuthServiceError> {
        let message = self.compose(email, code, purpose);
        let mailer = Arc::clone(&self.mailer);
        let result = tokio::task::spawn_blocking(move || mailer.send(&message)).await;
        match result {
            Ok(Ok(())) => {
                tracing::info!(email, purpose = purpose.as_str(), "verification code sent");
                Ok(())
            }
            Ok(Err(e)) => Err(AuthServiceError::Delivery(e)),
            Err(e) => Err(AuthServiceError::Delivery(anyhow::Error::new(e))),
        }
    }
}
