//! Local (synchronous) input rules.
//!
//! Nothing here touches the network: a failing rule yields a
//! [`ValidationError`] that only ever updates the relevant field's error.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

pub const USERNAME_MIN_LEN: usize = 3;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const OTP_LENGTH: usize = 6;

pub const MSG_USERNAME_TOO_SHORT: &str = "Min 3 characters required";
pub const MSG_USERNAME_FORMAT: &str =
    "Username must start with a letter and contain only letters, numbers, and underscores";
pub const MSG_EMAIL_REQUIRED: &str = "Email is required";
pub const MSG_EMAIL_INVALID: &str = "Please enter a valid email address";
pub const MSG_PASSWORD_REQUIRED: &str = "Password is required";
pub const MSG_PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters";
pub const MSG_PASSWORD_UPPERCASE: &str = "Password must contain an uppercase letter";
pub const MSG_PASSWORD_LOWERCASE: &str = "Password must contain a lowercase letter";
pub const MSG_PASSWORD_DIGIT: &str = "Password must contain a number";
pub const MSG_PASSWORD_SPECIAL: &str = "Password must contain a special character";
pub const MSG_CONFIRM_REQUIRED: &str = "Please confirm your password";
pub const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match";
pub const MSG_OTP_LENGTH: &str = "OTP must be 6 digits";

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("valid username regex"));

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// A local rule violation, carrying the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

/// Length first, then the letter-start / `[A-Za-z0-9_]` pattern.
pub fn validate_username(value: &str) -> ValidationResult {
    if value.chars().count() < USERNAME_MIN_LEN {
        return Err(ValidationError::new(MSG_USERNAME_TOO_SHORT));
    }
    if !USERNAME_PATTERN.is_match(value) {
        return Err(ValidationError::new(MSG_USERNAME_FORMAT));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> ValidationResult {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::new(MSG_EMAIL_REQUIRED));
    }
    if !EMAIL_PATTERN.is_match(value) {
        return Err(ValidationError::new(MSG_EMAIL_INVALID));
    }
    Ok(())
}

/// First failing rule wins.
pub fn validate_password(value: &str) -> ValidationResult {
    let rules: [(bool, &str); 6] = [
        (!value.is_empty(), MSG_PASSWORD_REQUIRED),
        (
            value.chars().count() >= PASSWORD_MIN_LEN,
            MSG_PASSWORD_TOO_SHORT,
        ),
        (
            value.chars().any(|c| c.is_ascii_uppercase()),
            MSG_PASSWORD_UPPERCASE,
        ),
        (
            value.chars().any(|c| c.is_ascii_lowercase()),
            MSG_PASSWORD_LOWERCASE,
        ),
        (value.chars().any(|c| c.is_ascii_digit()), MSG_PASSWORD_DIGIT),
        (
            value.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
            MSG_PASSWORD_SPECIAL,
        ),
    ];
    match rules.iter().find(|(ok, _)| !ok) {
        Some((_, message)) => Err(ValidationError::new(*message)),
        None => Ok(()),
    }
}

pub fn validate_confirm_password(password: &str, confirm: &str) -> ValidationResult {
    if confirm.is_empty() {
        return Err(ValidationError::new(MSG_CONFIRM_REQUIRED));
    }
    if password != confirm {
        return Err(ValidationError::new(MSG_PASSWORD_MISMATCH));
    }
    Ok(())
}

/// Strips non-digits and truncates to [`OTP_LENGTH`], as the OTP input does while typing.
pub fn sanitize_otp(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_digit)
        .take(OTP_LENGTH)
        .collect()
}

pub fn validate_otp(value: &str) -> ValidationResult {
    if value.len() == OTP_LENGTH && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new(MSG_OTP_LENGTH))
    }
}
