//! Forgot-password form: a single email field.

use plaza_core::validation::validate_email;

pub const MSG_RESET_SUBMITTED: &str = "Reset password email submitted";

#[derive(Debug, Default)]
pub struct PasswordResetForm {
    email: String,
    error: Option<String>,
    submitted: bool,
}

impl PasswordResetForm {
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn set_email(&mut self, value: String) {
        self.email = value;
        self.error = validate_email(&self.email)
            .err()
            .map(|e| e.message().to_string());
    }

    /// Returns the trimmed email when it passes validation.
    pub fn submit(&mut self) -> Option<String> {
        match validate_email(&self.email) {
            Ok(()) => {
                self.error = None;
                self.submitted = true;
                Some(self.email.trim().to_string())
            }
            Err(err) => {
                self.error = Some(err.message().to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use plaza_core::validation::{MSG_EMAIL_INVALID, MSG_EMAIL_REQUIRED};

    use super::*;

    #[test]
    fn test_empty_email_is_rejected() {
        let mut form = PasswordResetForm::default();
        assert_eq!(form.submit(), None);
        assert_eq!(form.error(), Some(MSG_EMAIL_REQUIRED));
        assert!(!form.is_submitted());
    }

    #[test]
    fn test_valid_email_submits_trimmed() {
        let mut form = PasswordResetForm::default();
        form.set_email("nope".to_string());
        assert_eq!(form.error(), Some(MSG_EMAIL_INVALID));

        form.set_email(" john@example.com ".to_string());
        assert_eq!(form.error(), None);
        assert_eq!(form.submit().as_deref(), Some("john@example.com"));
        assert!(form.is_submitted());
    }
}
