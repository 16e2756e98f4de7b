//! Request input validation.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::types::{PASSWORD_MAX_LEN, PASSWORD_MIN_LEN};
use crate::error::AuthServiceError;

const EMAIL_MAX_LEN: usize = 254;

/// Trim and lowercase so lookups and uniqueness are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), AuthServiceError> {
    if email.is_empty() {
        return Err(invalid("email is required"));
    }
    if email.len() > EMAIL_MAX_LEN {
        return Err(invalid("email must be at most 254 characters long"));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("email regex compiles")
    });
    if !regex.is_match(email) {
        return Err(invalid("invalid email address"));
    }
    Ok(())
}

/// Length is the only strength rule; counted in characters, not bytes.
pub fn validate_password(password: &str) -> Result<(), AuthServiceError> {
    let len = password.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err(invalid("password must be at least 8 characters"));
    }
    if len > PASSWORD_MAX_LEN {
        return Err(invalid("password must be at most 128 characters"));
    }
    Ok(())
}

/// Codes are exactly six ASCII digits; anything else can never match the ledger.
pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == crate::domain::types::CODE_LEN && code.bytes().all(|b| b.is_ascii_digit())
}

fn invalid(message: &str) -> AuthServiceError {
    AuthServiceError::Validation(message.to_owned())
}
