use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;

use matrimony_auth_types::cookie::{clear_session_cookie, session_id_from_jar};
use matrimony_auth_types::session::SessionCookie;

use crate::domain::types::UserView;
use crate::error::AuthServiceError;
use crate::handlers::MessageResponse;
use crate::state::AppState;
use crate::usecase::session::CurrentUserUseCase;

// ── GET /api/auth/user ────────────────────────────────────────────────────────

pub async fn current_user(
    State(state): State<AppState>,
    session: Result<SessionCookie, StatusCode>,
) -> Result<Json<UserView>, AuthServiceError> {
    let SessionCookie(session_id) = session.map_err(|_| AuthServiceError::Unauthorized)?;
    let usecase = CurrentUserUseCase {
        sessions: state.session_issuer(),
        users: state.user_repo(),
    };
    Ok(Json(usecase.execute(&session_id).await?))
}

// ── POST /api/auth/logout ─────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthServiceError> {
    if let Some(session_id) = session_id_from_jar(&jar) {
        state.session_issuer().clear(&session_id).await?;
    }
    let jar = clear_session_cookie(jar, &state.cookie);
    Ok((
        jar,
        Json(MessageResponse {
            message: "Logged out successfully",
        }),
    ))
}
