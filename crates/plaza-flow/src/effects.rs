//! Flow effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They cover timers, network calls and token storage; the reducer itself
//! never performs I/O or spawns tasks.
//!
//! ## Cancellation
//!
//! Timers are cancelled from the reducer via `CancelUsernameCheck` and
//! `StopCountdown`. The runtime owns the tokens and calls `cancel()` on them.

use plaza_core::auth::SignupRequest;

use crate::common::RequestId;

/// Effects returned by the reducer for the runtime to execute.
pub enum FlowEffect {
    /// Wait for the debounce delay, then check `username` remotely.
    /// Replaces any pending check.
    ScheduleUsernameCheck { id: RequestId, username: String },

    /// Drop the pending debounce timer (if any).
    CancelUsernameCheck,

    /// Send the signup request.
    Signup { request: SignupRequest },

    /// Store the access token, then report back with the account email.
    PersistToken { token: String, email: String },

    /// (Re)start the one-second resend countdown. Its ticks carry `id`.
    StartCountdown { id: RequestId },

    /// Stop the countdown timer.
    StopCountdown,

    /// Verify `otp` for `email` using the stored token.
    VerifyOtp { email: String, otp: String },

    /// Request a new OTP using the stored token.
    ResendOtp,
}

// Manual impl keeps the password and token out of logs.
impl std::fmt::Debug for FlowEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ScheduleUsernameCheck { id, username } => f
                .debug_struct("ScheduleUsernameCheck")
                .field("id", id)
                .field("username", username)
                .finish(),
            Self::CancelUsernameCheck => f.write_str("CancelUsernameCheck"),
            Self::Signup { request } => f
                .debug_struct("Signup")
                .field("user_name", &request.user_name)
                .field("user_email", &request.user_email)
                .finish_non_exhaustive(),
            Self::PersistToken { email, .. } => f
                .debug_struct("PersistToken")
                .field("email", email)
                .finish_non_exhaustive(),
            Self::StartCountdown { id } => {
                f.debug_struct("StartCountdown").field("id", id).finish()
            }
            Self::StopCountdown => f.write_str("StopCountdown"),
            Self::VerifyOtp { email, .. } => f
                .debug_struct("VerifyOtp")
                .field("email", email)
                .finish_non_exhaustive(),
            Self::ResendOtp => f.write_str("ResendOtp"),
        }
    }
}
