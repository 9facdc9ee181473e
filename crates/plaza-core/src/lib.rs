//! Core Plaza library (config, HTTP client, auth API, session storage, validation).

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod session;
pub mod validation;
