//! Signup form controller.
//!
//! Holds the four field values, their synchronous errors and the username
//! availability check. Submission is gated on every rule passing and the
//! username being confirmed available.

use enum_map::{Enum, EnumMap};
use plaza_core::auth::SignupRequest;
use plaza_core::validation::{
    ValidationResult, validate_confirm_password, validate_email, validate_password,
};

use crate::effects::FlowEffect;
use crate::features::username::{UsernameCheckState, UsernameValidator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum Field {
    Username,
    Email,
    Password,
    ConfirmPassword,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Username => "username",
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirmPassword",
        }
    }
}

/// Per-field error messages (`None` means no error).
pub type FieldErrors = EnumMap<Field, Option<String>>;

#[derive(Debug, Default)]
pub struct SignupForm {
    values: EnumMap<Field, String>,
    errors: EnumMap<Field, Option<String>>,
    touched: EnumMap<Field, bool>,
    username: UsernameValidator,
    submitting: bool,
}

impl SignupForm {
    pub fn value(&self, field: Field) -> &str {
        &self.values[field]
    }

    pub fn username_state(&self) -> &UsernameCheckState {
        self.username.state()
    }

    pub(crate) fn username_mut(&mut self) -> &mut UsernameValidator {
        &mut self.username
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Updates a field and re-runs its synchronous rules.
    ///
    /// A password change also re-checks the confirmation once that field has
    /// been touched.
    pub fn set_field(&mut self, field: Field, value: String) -> Vec<FlowEffect> {
        self.values[field] = value;
        self.touched[field] = true;

        match field {
            Field::Username => {
                let value = self.values[Field::Username].clone();
                self.username.on_input(&value)
            }
            Field::Password => {
                self.revalidate(Field::Password);
                if self.touched[Field::ConfirmPassword] {
                    self.revalidate(Field::ConfirmPassword);
                }
                vec![]
            }
            Field::Email | Field::ConfirmPassword => {
                self.revalidate(field);
                vec![]
            }
        }
    }

    fn revalidate(&mut self, field: Field) {
        let result: ValidationResult = match field {
            // Username errors live in the availability state.
            Field::Username => Ok(()),
            Field::Email => validate_email(&self.values[Field::Email]),
            Field::Password => validate_password(&self.values[Field::Password]),
            Field::ConfirmPassword => validate_confirm_password(
                &self.values[Field::Password],
                &self.values[Field::ConfirmPassword],
            ),
        };
        self.errors[field] = result.err().map(|e| e.message().to_string());
    }

    /// Current errors, with the username entry taken from the availability state.
    pub fn errors(&self) -> FieldErrors {
        let mut errors = self.errors.clone();
        errors[Field::Username] = self.username.state().error().map(str::to_string);
        errors
    }

    pub fn error(&self, field: Field) -> Option<String> {
        self.errors()[field].clone()
    }

    /// True iff the username is available, no field has an error and the
    /// confirmation is non-empty.
    pub fn can_submit(&self) -> bool {
        self.username.is_available()
            && self.errors().values().all(Option::is_none)
            && !self.values[Field::ConfirmPassword].is_empty()
    }

    /// Validates every field, then issues the signup request if allowed.
    ///
    /// No-op while a previous signup is in flight or when the form is not
    /// submittable.
    pub fn submit(&mut self) -> Vec<FlowEffect> {
        for field in [Field::Email, Field::Password, Field::ConfirmPassword] {
            self.touched[field] = true;
            self.revalidate(field);
        }

        if self.submitting || !self.can_submit() {
            return vec![];
        }

        self.submitting = true;
        vec![FlowEffect::Signup {
            request: SignupRequest {
                user_name: self.values[Field::Username].clone(),
                user_email: self.values[Field::Email].trim().to_string(),
                user_password: self.values[Field::Password].clone(),
            },
        }]
    }

    /// Marks the in-flight signup as finished. Field values are left untouched.
    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }
}
