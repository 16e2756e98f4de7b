//! Session types shared across Matrimony services.
//!
//! Provides the session cookie builders, the opaque `SessionId` and the
//! `SessionCookie` extractor used by any service that needs to know who is calling.

pub mod cookie;
pub mod session;
