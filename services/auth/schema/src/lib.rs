//! sea-orm entities owned by the auth service.

pub mod login_logs;
pub mod oauth_states;
pub mod one_time_codes;
pub mod pending_verifications;
pub mod sessions;
pub mod users;
