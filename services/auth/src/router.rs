use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use matrimony_core::health::healthz;
use matrimony_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    google::{google_begin, google_callback},
    health::readyz,
    login::{login, login_otp, verify_login_otp},
    password::{forgot_password, reset_password},
    register::{register, verify_register},
    session::{current_user, logout},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let auth = Router::new()
        // Registration
        .route("/register", post(register))
        .route("/verify-register", post(verify_register))
        // Password and code login
        .route("/login", post(login))
        .route("/login-otp", post(login_otp))
        .route("/verify-login-otp", post(verify_login_otp))
        // Password reset
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        // Google
        .route("/google", get(google_begin))
        .route("/google/callback", get(google_callback))
        // Session
        .route("/user", get(current_user))
        .route("/logout", post(logout));

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api/auth", auth)
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
