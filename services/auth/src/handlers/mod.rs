pub mod google;
pub mod health;
pub mod login;
pub mod password;
pub mod register;
pub mod session;

use serde::Serialize;

/// Plain `{ "message": ... }` body.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
