use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use matrimony_auth_types::cookie::{ensure_session, set_session_cookie};

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::federated::FederatedLoginUseCase;

/// Where the browser lands after a failed provider round-trip.
const GOOGLE_FAILED_REDIRECT: &str = "/login?error=google_failed";

// ── GET /api/auth/google ──────────────────────────────────────────────────────

/// The state handed to the provider is bound to the caller's session cookie.
pub async fn google_begin(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AuthServiceError> {
    let provider = state
        .google
        .clone()
        .ok_or(AuthServiceError::FederatedUnavailable)?;
    let (jar, session_id) = ensure_session(jar, &state.cookie);
    let usecase = FederatedLoginUseCase {
        provider,
        states: state.oauth_state_repo(),
        reconciler: state.reconciler(),
        sessions: state.session_issuer(),
    };
    let url = usecase.begin(&session_id).await?;
    Ok((jar, Redirect::to(&url)))
}

// ── GET /api/auth/google/callback ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, AuthServiceError> {
    let provider = state
        .google
        .clone()
        .ok_or(AuthServiceError::FederatedUnavailable)?;

    let (Some(code), Some(csrf_state)) = (query.code, query.state) else {
        tracing::warn!(
            provider_error = query.error.as_deref().unwrap_or("missing code or state"),
            "google callback rejected"
        );
        return Ok(Redirect::to(GOOGLE_FAILED_REDIRECT).into_response());
    };

    let (jar, session_id) = ensure_session(jar, &state.cookie);
    let usecase = FederatedLoginUseCase {
        provider,
        states: state.oauth_state_repo(),
        reconciler: state.reconciler(),
        sessions: state.session_issuer(),
    };

    match usecase.complete(&session_id, &code, &csrf_state).await {
        Ok(signed_in) => {
            tracing::info!(user_id = %signed_in.user.id, "google sign-in completed");
            let jar = set_session_cookie(jar, &signed_in.session_id, &state.cookie);
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(AuthServiceError::FederatedFailed(e)) => {
            tracing::warn!(error = %format!("{e:#}"), "google sign-in failed");
            Ok((jar, Redirect::to(GOOGLE_FAILED_REDIRECT)).into_response())
        }
        Err(e) => Err(e),
    }
}
