//! CLI command handlers.

pub mod config;
pub mod otp;
pub mod password;
pub mod session;
pub mod signup;

use std::sync::Arc;

use anyhow::Result;
use plaza_core::auth::AuthClient;
use plaza_core::config::Config;
use plaza_core::session::FileSessionStore;
use plaza_flow::{AppState, FlowRuntime, NotificationLevel, RuntimeOptions};

pub type CliRuntime = FlowRuntime<AuthClient, FileSessionStore>;

/// Builds a runtime talking to the configured server with the on-disk session.
pub fn flow_runtime(config: &Config, options: RuntimeOptions) -> Result<CliRuntime> {
    let base_url = config.base_url()?;
    tracing::debug!(%base_url, "using server");
    Ok(FlowRuntime::new(
        Arc::new(AuthClient::from_base_url(base_url)),
        Arc::new(FileSessionStore::default()),
        options,
    ))
}

/// Prints queued info notifications to stdout.
///
/// Returns the last error message, left for the caller to report.
pub fn flush_notifications(state: &mut AppState) -> Option<String> {
    let mut last_error = None;
    for notification in state.take_notifications() {
        match notification.level {
            NotificationLevel::Info => println!("{}", notification.message),
            NotificationLevel::Error => last_error = Some(notification.message),
        }
    }
    last_error
}
