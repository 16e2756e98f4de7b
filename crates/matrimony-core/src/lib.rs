//! Service plumbing shared by Matrimony binaries: tracing setup, liveness check,
//! request ids and environment configuration.

pub mod config;
pub mod health;
pub mod middleware;
pub mod tracing;
