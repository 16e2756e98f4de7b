use axum::{Json, extract::State};
use serde::Deserialize;

use crate::error::AuthServiceError;
use crate::handlers::MessageResponse;
use crate::infra::db::{DbCodeRepository, DbUserRepository};
use crate::state::AppState;
use crate::usecase::password_reset::{PasswordResetUseCase, ResetPasswordInput};

fn usecase(state: &AppState) -> PasswordResetUseCase<DbUserRepository, DbCodeRepository> {
    PasswordResetUseCase {
        users: state.user_repo(),
        ledger: state.ledger(),
        dispatcher: state.dispatcher.clone(),
        hash_cost: state.password_hash_cost,
    }
}

// ── POST /api/auth/forgot-password ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthServiceError> {
    usecase(&state).request(&body.email).await?;
    Ok(Json(MessageResponse {
        message: "If an account exists, a reset code has been sent",
    }))
}

// ── POST /api/auth/reset-password ─────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub new_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthServiceError> {
    usecase(&state)
        .reset(ResetPasswordInput {
            email: body.email,
            code: body.code,
            new_password: body.new_password,
        })
        .await?;
    Ok(Json(MessageResponse {
        message: "Password reset successful. You can now login with your new password.",
    }))
}
