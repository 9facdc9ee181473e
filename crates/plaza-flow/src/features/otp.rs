//! OTP verification screen: code input, verify action and the resend countdown.

use plaza_core::validation::{ValidationError, sanitize_otp, validate_otp};

use crate::common::{LatestOnly, RequestId};
use crate::effects::FlowEffect;

pub const DEFAULT_COOLDOWN_SECS: u32 = 60;

/// Resend cooldown. Counts down one second per tick; resend is allowed at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpCountdown {
    remaining: u32,
    cooldown: u32,
}

impl Default for OtpCountdown {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN_SECS)
    }
}

impl OtpCountdown {
    pub fn new(cooldown: u32) -> Self {
        Self {
            remaining: cooldown,
            cooldown,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn can_resend(&self) -> bool {
        self.remaining == 0
    }

    /// Decrements by one second. Returns true when this tick reached zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }

    pub fn reset(&mut self) {
        self.remaining = self.cooldown;
    }
}

/// Formats seconds as `m:ss`.
pub fn format_remaining(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Debug, Default)]
pub struct OtpScreen {
    email: String,
    input: String,
    countdown: OtpCountdown,
    verifying: bool,
    resending: bool,
    // Survives `open` so a timer from a previous screen never matches.
    timer: LatestOnly,
}

impl OtpScreen {
    pub fn new(email: impl Into<String>, cooldown: u32) -> Self {
        Self {
            email: email.into(),
            countdown: OtpCountdown::new(cooldown),
            ..Self::default()
        }
    }

    /// Resets the screen for `email` and (re)starts the countdown.
    ///
    /// Ticks from any earlier countdown are ignored from here on.
    pub fn open(&mut self, email: impl Into<String>, cooldown: u32) -> Vec<FlowEffect> {
        let timer = std::mem::take(&mut self.timer);
        *self = Self {
            timer,
            ..Self::new(email, cooldown)
        };
        self.start_countdown()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn countdown(&self) -> &OtpCountdown {
        &self.countdown
    }

    pub fn is_verifying(&self) -> bool {
        self.verifying
    }

    pub fn is_resending(&self) -> bool {
        self.resending
    }

    /// Keeps digits only, at most six.
    pub fn set_input(&mut self, raw: &str) {
        self.input = sanitize_otp(raw);
    }

    /// Starts verification of the current input.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] unless the input is exactly six digits.
    pub fn verify(&mut self) -> Result<Vec<FlowEffect>, ValidationError> {
        validate_otp(&self.input)?;
        if self.verifying {
            return Ok(vec![]);
        }
        self.verifying = true;
        Ok(vec![FlowEffect::VerifyOtp {
            email: self.email.clone(),
            otp: self.input.clone(),
        }])
    }

    pub fn finish_verify(&mut self) {
        self.verifying = false;
    }

    /// Accepted only once the countdown has run out and no resend is in flight.
    /// A rejected request leaves the state unchanged.
    pub fn request_resend(&mut self) -> Option<FlowEffect> {
        if !self.countdown.can_resend() || self.resending {
            return None;
        }
        self.resending = true;
        Some(FlowEffect::ResendOtp)
    }

    /// Success restarts the countdown; failure leaves resend available.
    pub fn on_resent(&mut self, succeeded: bool) -> Vec<FlowEffect> {
        self.resending = false;
        if succeeded {
            self.countdown.reset();
            self.start_countdown()
        } else {
            vec![]
        }
    }

    /// Applies a tick from countdown `id`. Ticks from a replaced or stopped
    /// countdown are dropped.
    pub fn tick(&mut self, id: RequestId) -> Vec<FlowEffect> {
        if !self.timer.is_active(id) {
            return vec![];
        }
        self.countdown.tick();
        if self.countdown.can_resend() {
            self.stop_countdown()
        } else {
            vec![]
        }
    }

    pub fn stop_countdown(&mut self) -> Vec<FlowEffect> {
        self.timer.cancel();
        vec![FlowEffect::StopCountdown]
    }

    // A zero cooldown never starts a timer.
    fn start_countdown(&mut self) -> Vec<FlowEffect> {
        if self.countdown.can_resend() {
            return self.stop_countdown();
        }
        vec![FlowEffect::StartCountdown {
            id: self.timer.begin(),
        }]
    }
}
