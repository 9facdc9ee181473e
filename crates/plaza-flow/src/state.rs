//! Application state owned by the runtime and mutated only by the reducer.

use std::collections::VecDeque;

use crate::features::otp::{DEFAULT_COOLDOWN_SECS, OtpScreen};
use crate::features::password_reset::PasswordResetForm;
use crate::features::post::PostDraft;
use crate::features::signup::SignupForm;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Signup,
    Otp,
    PasswordReset,
    Compose,
}

/// Navigation request raised by the reducer for the front end to follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Otp { email: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Transient message for the user (a toast in a graphical front end).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub signup: SignupForm,
    pub otp: OtpScreen,
    pub password_reset: PasswordResetForm,
    pub post: PostDraft,
    /// Seconds before an OTP resend is allowed, applied when the OTP screen opens.
    pub resend_cooldown_secs: u32,
    notifications: VecDeque<Notification>,
    navigation: Option<Route>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN_SECS)
    }
}

impl AppState {
    pub fn new(resend_cooldown_secs: u32) -> Self {
        Self {
            screen: Screen::default(),
            signup: SignupForm::default(),
            otp: OtpScreen::new(String::new(), resend_cooldown_secs),
            password_reset: PasswordResetForm::default(),
            post: PostDraft::default(),
            resend_cooldown_secs,
            notifications: VecDeque::new(),
            navigation: None,
        }
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
    }

    /// Drains queued notifications, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    pub fn navigate(&mut self, route: Route) {
        self.navigation = Some(route);
    }

    pub fn pending_navigation(&self) -> Option<&Route> {
        self.navigation.as_ref()
    }

    pub fn take_navigation(&mut self) -> Option<Route> {
        self.navigation.take()
    }
}
