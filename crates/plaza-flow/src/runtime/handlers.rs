//! Effect handlers for the flow runtime.
//!
//! Handlers are async functions that perform I/O and return the resulting
//! `FlowEvent`. They never touch state; the runtime spawns them and forwards
//! their result to the inbox.

use std::sync::Arc;
use std::time::Duration;

use plaza_core::auth::{AuthService, SignupRequest, VerifyOtpRequest};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::common::RequestId;
use crate::events::FlowEvent;

/// Waits out the debounce window, then checks availability.
///
/// Returns `None` when cancelled during the wait. Once the request is sent it
/// runs to completion; staleness is decided by the reducer.
pub async fn username_check<A: AuthService>(
    auth: Arc<A>,
    id: RequestId,
    username: String,
    delay: Duration,
    cancel: CancellationToken,
) -> Option<FlowEvent> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => return None,
        () = tokio::time::sleep(delay) => {}
    }

    tracing::debug!(id = id.get(), username = %username, "checking username");
    let result = auth
        .check_username_availability(&username)
        .await
        .map(|availability| availability.user_exists)
        .map_err(|e| e.to_string());
    Some(FlowEvent::UsernameChecked { id, result })
}

pub async fn signup<A: AuthService>(auth: Arc<A>, request: SignupRequest) -> Option<FlowEvent> {
    let result = auth.signup(&request).await.map_err(|e| e.to_string());
    Some(FlowEvent::SignupFinished(result))
}

pub async fn verify_otp<A: AuthService>(
    auth: Arc<A>,
    email: String,
    otp: String,
    token: String,
) -> Option<FlowEvent> {
    let request = VerifyOtpRequest {
        user_email: email,
        otp_value: otp,
    };
    let result = auth
        .verify_otp(&request, &token)
        .await
        .map(|response| response.message)
        .map_err(|e| e.to_string());
    Some(FlowEvent::OtpVerified(result))
}

pub async fn resend_otp<A: AuthService>(auth: Arc<A>, token: String) -> Option<FlowEvent> {
    let result = auth
        .resend_otp(&token)
        .await
        .map(|response| response.message)
        .map_err(|e| e.to_string());
    Some(FlowEvent::OtpResent(result))
}

/// Sends one `Tick` per period (the first after one full period) until cancelled.
pub async fn countdown(
    id: RequestId,
    period: Duration,
    cancel: CancellationToken,
    tx: UnboundedSender<FlowEvent>,
) {
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if tx.send(FlowEvent::Tick { id }).is_err() {
                    break;
                }
            }
        }
    }
}
