//! Debounced username availability.
//!
//! Local rules run synchronously on every keystroke. Only a locally valid
//! value schedules a remote check, and only the latest scheduled check may
//! change the state.

use plaza_core::validation::validate_username;

use crate::common::{LatestOnly, RequestId};
use crate::effects::FlowEffect;

pub const MSG_USERNAME_TAKEN: &str = "Username taken";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UsernameCheckState {
    #[default]
    Idle,
    Checking,
    Available,
    Unavailable(String),
    Invalid(String),
}

impl UsernameCheckState {
    /// Message to show under the field, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Unavailable(reason) | Self::Invalid(reason) => Some(reason),
            Self::Idle | Self::Checking | Self::Available => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct UsernameValidator {
    state: UsernameCheckState,
    requests: LatestOnly,
}

impl UsernameValidator {
    pub fn state(&self) -> &UsernameCheckState {
        &self.state
    }

    pub fn is_available(&self) -> bool {
        self.state == UsernameCheckState::Available
    }

    /// Applies a new input value.
    ///
    /// A valid value supersedes any pending check and schedules a new one;
    /// anything else cancels the pending check without touching the network.
    pub fn on_input(&mut self, value: &str) -> Vec<FlowEffect> {
        if value.is_empty() {
            self.requests.cancel();
            self.state = UsernameCheckState::Idle;
            return vec![FlowEffect::CancelUsernameCheck];
        }

        if let Err(err) = validate_username(value) {
            self.requests.cancel();
            self.state = UsernameCheckState::Invalid(err.message().to_string());
            return vec![FlowEffect::CancelUsernameCheck];
        }

        let id = self.requests.begin();
        self.state = UsernameCheckState::Checking;
        tracing::debug!(id = id.get(), username = value, "scheduling username check");
        vec![FlowEffect::ScheduleUsernameCheck {
            id,
            username: value.to_string(),
        }]
    }

    /// Applies a remote result. Returns false when the result was stale and discarded.
    pub fn on_result(&mut self, id: RequestId, result: Result<bool, String>) -> bool {
        if !self.requests.finish_if_active(id) {
            tracing::debug!(id = id.get(), "discarding stale username check");
            return false;
        }

        self.state = match result {
            Ok(false) => UsernameCheckState::Available,
            Ok(true) => UsernameCheckState::Unavailable(MSG_USERNAME_TAKEN.to_string()),
            Err(message) => UsernameCheckState::Unavailable(message),
        };
        true
    }

    /// Drops any pending check so a late result is ignored.
    pub fn cancel(&mut self) {
        self.requests.cancel();
        if self.state == UsernameCheckState::Checking {
            self.state = UsernameCheckState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use plaza_core::validation::{MSG_USERNAME_FORMAT, MSG_USERNAME_TOO_SHORT};

    use super::*;

    fn scheduled_id(effects: &[FlowEffect]) -> RequestId {
        match effects {
            [FlowEffect::ScheduleUsernameCheck { id, .. }] => *id,
            other => panic!("expected a scheduled check, got {other:?}"),
        }
    }

    #[test]
    fn test_short_username_is_invalid_without_check() {
        let mut validator = UsernameValidator::default();
        let effects = validator.on_input("ab");
        assert!(matches!(effects[..], [FlowEffect::CancelUsernameCheck]));
        assert_eq!(
            validator.state(),
            &UsernameCheckState::Invalid(MSG_USERNAME_TOO_SHORT.to_string())
        );
    }

    #[test]
    fn test_pattern_failure_is_invalid_without_check() {
        let mut validator = UsernameValidator::default();
        let effects = validator.on_input("9lives");
        assert!(matches!(effects[..], [FlowEffect::CancelUsernameCheck]));
        assert_eq!(
            validator.state(),
            &UsernameCheckState::Invalid(MSG_USERNAME_FORMAT.to_string())
        );
    }

    #[test]
    fn test_empty_username_goes_idle() {
        let mut validator = UsernameValidator::default();
        validator.on_input("john");
        validator.on_input("");
        assert_eq!(validator.state(), &UsernameCheckState::Idle);
        assert_eq!(validator.state().error(), None);
    }

    #[test]
    fn test_valid_username_checks_and_resolves() {
        let mut validator = UsernameValidator::default();
        let id = scheduled_id(&validator.on_input("john"));
        assert_eq!(validator.state(), &UsernameCheckState::Checking);

        assert!(validator.on_result(id, Ok(true)));
        assert_eq!(
            validator.state(),
            &UsernameCheckState::Unavailable(MSG_USERNAME_TAKEN.to_string())
        );
    }

    #[test]
    fn test_error_result_is_unavailable_with_message() {
        let mut validator = UsernameValidator::default();
        let id = scheduled_id(&validator.on_input("john"));
        validator.on_result(id, Err("Service down".to_string()));
        assert_eq!(
            validator.state(),
            &UsernameCheckState::Unavailable("Service down".to_string())
        );
    }

    #[test]
    fn test_older_result_never_overwrites_newer() {
        let mut validator = UsernameValidator::default();
        let first = scheduled_id(&validator.on_input("alice"));
        let second = scheduled_id(&validator.on_input("alice_j"));

        assert!(validator.on_result(second, Ok(false)));
        assert!(!validator.on_result(first, Ok(true)));
        assert!(validator.is_available());
    }

    #[test]
    fn test_result_after_local_failure_is_ignored() {
        let mut validator = UsernameValidator::default();
        let id = scheduled_id(&validator.on_input("john"));
        validator.on_input("jo");
        assert!(!validator.on_result(id, Ok(false)));
        assert_eq!(
            validator.state(),
            &UsernameCheckState::Invalid(MSG_USERNAME_TOO_SHORT.to_string())
        );
    }
}
