pub mod dispatch;
pub mod federated;
pub mod login;
pub mod otp;
pub mod password;
pub mod password_reset;
pub mod register;
pub mod session;
pub mod validation;
