use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use matrimony_auth_types::cookie::ensure_session;

use crate::handlers::register::signed_in_response;
use crate::state::AppState;
use crate::usecase::login::{
    CodeLoginInput, CodeLoginUseCase, PasswordLoginInput, PasswordLoginUseCase,
};

// ── POST /api/auth/login ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> impl IntoResponse {
    let (jar, session_id) = ensure_session(jar, &state.cookie);
    let usecase = PasswordLoginUseCase {
        users: state.user_repo(),
        sessions: state.session_issuer(),
    };

    let result = usecase
        .execute(
            &session_id,
            PasswordLoginInput {
                email: body.email,
                password: body.password,
            },
        )
        .await;
    signed_in_response(jar, &state.cookie, result, "Login successful")
}

// ── POST /api/auth/login-otp ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginCodeRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSentResponse {
    pub message: &'static str,
    pub requires_verification: bool,
}

pub async fn login_otp(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginCodeRequest>,
) -> impl IntoResponse {
    let (jar, session_id) = ensure_session(jar, &state.cookie);
    let usecase = CodeLoginUseCase {
        users: state.user_repo(),
        ledger: state.ledger(),
        sessions: state.session_issuer(),
        dispatcher: state.dispatcher.clone(),
    };

    let result = usecase.start(&session_id, &body.email).await.map(|()| {
        Json(CodeSentResponse {
            message: "Verification code sent to your email",
            requires_verification: true,
        })
    });
    (jar, result)
}

// ── POST /api/auth/verify-login-otp ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyLoginCodeRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
}

pub async fn verify_login_otp(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<VerifyLoginCodeRequest>,
) -> impl IntoResponse {
    let (jar, session_id) = ensure_session(jar, &state.cookie);
    let usecase = CodeLoginUseCase {
        users: state.user_repo(),
        ledger: state.ledger(),
        sessions: state.session_issuer(),
        dispatcher: state.dispatcher.clone(),
    };

    let result = usecase
        .verify(
            &session_id,
            CodeLoginInput {
                email: body.email,
                code: body.code,
            },
        )
        .await;
    signed_in_response(jar, &state.cookie, result, "Login successful")
}
