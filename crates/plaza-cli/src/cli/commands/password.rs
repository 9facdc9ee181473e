//! Forgot-password command handler.

use anyhow::{Result, bail};
use plaza_flow::update::update;
use plaza_flow::{AppState, FlowEvent};

use super::flush_notifications;

/// Validates the email and records the reset request. Nothing is sent to the server.
pub fn forgot(email: &str) -> Result<()> {
    let mut state = AppState::default();
    for event in [
        FlowEvent::ForgotPasswordOpened,
        FlowEvent::ResetEmailChanged(email.to_string()),
        FlowEvent::ResetSubmitted,
    ] {
        update(&mut state, event);
    }

    if let Some(error) = state.password_reset.error() {
        bail!("{error}");
    }
    flush_notifications(&mut state);
    Ok(())
}
