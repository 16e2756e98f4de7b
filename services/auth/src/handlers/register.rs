use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use matrimony_auth_types::cookie::{SessionCookieConfig, ensure_session, set_session_cookie};

use crate::domain::types::UserView;
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::register::{RegisterInput, RegisterUseCase, VerifyRegisterInput};
use crate::usecase::session::SignedIn;

// ── POST /api/auth/register ───────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRegistration {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: &'static str,
    pub requires_verification: bool,
    pub temp_data: PendingRegistration,
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> impl IntoResponse {
    let (jar, session_id) = ensure_session(jar, &state.cookie);
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        ledger: state.ledger(),
        sessions: state.session_issuer(),
        dispatcher: state.dispatcher.clone(),
        hash_cost: state.password_hash_cost,
    };

    let result = usecase
        .start(
            &session_id,
            RegisterInput {
                email: body.email,
                password: body.password,
                first_name: body.first_name,
                last_name: body.last_name,
            },
        )
        .await
        .map(|out| {
            Json(RegisterResponse {
                message: "Verification code sent to your email",
                requires_verification: true,
                temp_data: PendingRegistration {
                    email: out.email,
                    first_name: out.first_name,
                    last_name: out.last_name,
                },
            })
        });
    (jar, result)
}

// ── POST /api/auth/verify-register ────────────────────────────────────────────

/// Any client-supplied registration payload beyond email and code is ignored; the
/// pending registration is read from the session.
#[derive(Deserialize)]
pub struct VerifyRegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Serialize)]
pub struct AuthenticatedResponse {
    pub message: &'static str,
    pub user: UserView,
}

/// On success the cookie is pointed at the rotated session id.
pub(crate) fn signed_in_response(
    jar: CookieJar,
    cookie: &SessionCookieConfig,
    result: Result<SignedIn, AuthServiceError>,
    message: &'static str,
) -> (CookieJar, Result<Json<AuthenticatedResponse>, AuthServiceError>) {
    match result {
        Ok(signed_in) => (
            set_session_cookie(jar, &signed_in.session_id, cookie),
            Ok(Json(AuthenticatedResponse {
                message,
                user: signed_in.user.view(),
            })),
        ),
        Err(e) => (jar, Err(e)),
    }
}

pub async fn verify_register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<VerifyRegisterRequest>,
) -> impl IntoResponse {
    let (jar, session_id) = ensure_session(jar, &state.cookie);
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        ledger: state.ledger(),
        sessions: state.session_issuer(),
        dispatcher: state.dispatcher.clone(),
        hash_cost: state.password_hash_cost,
    };

    let result = usecase
        .verify(
            &session_id,
            VerifyRegisterInput {
                email: body.email,
                code: body.code,
            },
        )
        .await;
    signed_in_response(jar, &state.cookie, result, "Registration successful")
}
