//! Flow reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use plaza_core::auth::SignupResponse;

use crate::effects::FlowEffect;
use crate::events::FlowEvent;
use crate::features::password_reset::MSG_RESET_SUBMITTED;
use crate::features::post::PostDraft;
use crate::state::{AppState, Notification, Route, Screen};

const MSG_SIGNUP_FAILED: &str = "Signup failed";
const MSG_VERIFY_FAILED: &str = "Something went wrong!";
const MSG_RESEND_FAILED: &str = "Failed to resend OTP";

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: FlowEvent) -> Vec<FlowEffect> {
    match event {
        FlowEvent::FieldChanged { field, value } => app.signup.set_field(field, value),
        FlowEvent::SubmitSignup => app.signup.submit(),
        FlowEvent::UsernameChecked { id, result } => {
            app.signup.username_mut().on_result(id, result);
            vec![]
        }
        FlowEvent::SignupFinished(result) => handle_signup_result(app, result),
        FlowEvent::TokenPersisted { email } => {
            tracing::info!(email = %email, "signup complete");
            app.navigate(Route::Otp {
                email: email.clone(),
            });
            open_otp(app, email)
        }
        FlowEvent::StorageFailed(message) => {
            app.notify(Notification::error(message));
            vec![]
        }

        FlowEvent::OtpOpened { email } => open_otp(app, email),
        FlowEvent::OtpInput(raw) => {
            app.otp.set_input(&raw);
            vec![]
        }
        FlowEvent::VerifyRequested => match app.otp.verify() {
            Ok(effects) => effects,
            Err(err) => {
                app.notify(Notification::error(err.message()));
                vec![]
            }
        },
        FlowEvent::OtpVerified(result) => {
            app.otp.finish_verify();
            match result {
                Ok(message) => {
                    tracing::info!(email = app.otp.email(), "otp verified");
                    app.notify(Notification::info(message));
                }
                Err(message) => app.notify(Notification::error(non_empty_or(
                    message,
                    MSG_VERIFY_FAILED,
                ))),
            }
            vec![]
        }
        FlowEvent::ResendRequested => match app.otp.request_resend() {
            Some(effect) => vec![effect],
            None => {
                tracing::debug!(
                    remaining = app.otp.countdown().remaining(),
                    "resend rejected"
                );
                vec![]
            }
        },
        FlowEvent::OtpResent(result) => match result {
            Ok(message) => {
                app.notify(Notification::info(message));
                app.otp.on_resent(true)
            }
            Err(message) => {
                app.notify(Notification::error(non_empty_or(
                    message,
                    MSG_RESEND_FAILED,
                )));
                app.otp.on_resent(false)
            }
        },
        FlowEvent::Tick { id } => app.otp.tick(id),

        FlowEvent::ForgotPasswordOpened => {
            app.screen = Screen::PasswordReset;
            vec![]
        }
        FlowEvent::ResetEmailChanged(value) => {
            app.password_reset.set_email(value);
            vec![]
        }
        FlowEvent::ResetSubmitted => {
            if let Some(email) = app.password_reset.submit() {
                tracing::info!(email = %email, "password reset requested");
                app.notify(Notification::info(MSG_RESET_SUBMITTED));
            }
            vec![]
        }

        FlowEvent::ComposeOpened { directory } => {
            app.post = PostDraft::with_directory(directory);
            app.screen = Screen::Compose;
            vec![]
        }
        FlowEvent::CaptionChanged(caption) => {
            app.post.set_caption(caption);
            vec![]
        }
        FlowEvent::TagSearchChanged(query) => {
            app.post.set_search(query);
            vec![]
        }
        FlowEvent::TagToggled(user) => {
            app.post.toggle_tag(user);
            vec![]
        }
        FlowEvent::ImagesSelected(files) => {
            for message in app.post.add_images(files) {
                app.notify(Notification::error(message));
            }
            vec![]
        }
        FlowEvent::ImageRemoved(index) => {
            app.post.remove_image(index);
            vec![]
        }

        FlowEvent::Teardown => {
            app.signup.username_mut().cancel();
            let mut effects = vec![FlowEffect::CancelUsernameCheck];
            effects.extend(app.otp.stop_countdown());
            effects
        }
    }
}

fn handle_signup_result(
    app: &mut AppState,
    result: Result<SignupResponse, String>,
) -> Vec<FlowEffect> {
    app.signup.finish_submit();
    match result {
        Ok(response) => {
            if let Some(message) = response.message.filter(|m| !m.is_empty()) {
                app.notify(Notification::info(message));
            }
            vec![FlowEffect::PersistToken {
                token: response.access_token,
                email: response.user_email,
            }]
        }
        Err(message) => {
            app.notify(Notification::error(non_empty_or(message, MSG_SIGNUP_FAILED)));
            vec![]
        }
    }
}

fn open_otp(app: &mut AppState, email: String) -> Vec<FlowEffect> {
    app.screen = Screen::Otp;
    app.otp.open(email, app.resend_cooldown_secs)
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::RequestId;
    use crate::features::post::{ImageAttachment, TaggedUser};
    use crate::features::signup::Field;
    use crate::features::username::UsernameCheckState;
    use crate::state::NotificationLevel;

    /// Opens the OTP screen and returns the id its countdown ticks carry.
    fn open_otp_screen(app: &mut AppState) -> RequestId {
        let effects = update(
            app,
            FlowEvent::OtpOpened {
                email: "a@b.com".to_string(),
            },
        );
        match effects[..] {
            [FlowEffect::StartCountdown { id }] => id,
            ref other => panic!("unexpected effects: {other:?}"),
        }
    }

    fn signup_response(token: &str, email: &str) -> SignupResponse {
        SignupResponse {
            access_token: token.to_string(),
            user_email: email.to_string(),
            message: Some("Signup successful".to_string()),
            extra: Default::default(),
        }
    }

    #[test]
    fn test_signup_success_persists_before_navigating() {
        let mut app = AppState::default();
        let effects = update(
            &mut app,
            FlowEvent::SignupFinished(Ok(signup_response("tok123", "a@b.com"))),
        );
        match &effects[..] {
            [FlowEffect::PersistToken { token, email }] => {
                assert_eq!(token, "tok123");
                assert_eq!(email, "a@b.com");
            }
            other => panic!("unexpected effects: {other:?}"),
        }
        assert_eq!(app.pending_navigation(), None);

        let effects = update(
            &mut app,
            FlowEvent::TokenPersisted {
                email: "a@b.com".to_string(),
            },
        );
        assert!(matches!(effects[..], [FlowEffect::StartCountdown { .. }]));
        assert_eq!(
            app.take_navigation(),
            Some(Route::Otp {
                email: "a@b.com".to_string()
            })
        );
        assert_eq!(app.screen, Screen::Otp);
        assert_eq!(app.otp.email(), "a@b.com");
    }

    #[test]
    fn test_signup_failure_notifies_and_keeps_form() {
        let mut app = AppState::default();
        update(
            &mut app,
            FlowEvent::FieldChanged {
                field: Field::Email,
                value: "a@b.com".to_string(),
            },
        );
        let effects = update(
            &mut app,
            FlowEvent::SignupFinished(Err("Email already registered".to_string())),
        );
        assert!(effects.is_empty());
        assert_eq!(app.signup.value(Field::Email), "a@b.com");
        assert_eq!(app.screen, Screen::Signup);
        assert_eq!(
            app.take_notifications(),
            vec![Notification::error("Email already registered")]
        );
    }

    #[test]
    fn test_verify_with_five_digits_is_rejected_locally() {
        let mut app = AppState::default();
        update(
            &mut app,
            FlowEvent::OtpOpened {
                email: "a@b.com".to_string(),
            },
        );
        update(&mut app, FlowEvent::OtpInput("12345".to_string()));
        let effects = update(&mut app, FlowEvent::VerifyRequested);
        assert!(effects.is_empty());
        let notifications = app.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].level, NotificationLevel::Error);
    }

    #[test]
    fn test_verify_result_leaves_countdown_alone() {
        let mut app = AppState::default();
        let id = open_otp_screen(&mut app);
        update(&mut app, FlowEvent::Tick { id });
        update(&mut app, FlowEvent::OtpVerified(Err(String::new())));
        assert_eq!(app.otp.countdown().remaining(), 59);
        assert_eq!(
            app.take_notifications(),
            vec![Notification::error(MSG_VERIFY_FAILED)]
        );
    }

    #[test]
    fn test_resend_before_countdown_ends_is_rejected() {
        let mut app = AppState::new(3);
        let id = open_otp_screen(&mut app);
        update(&mut app, FlowEvent::Tick { id });
        assert!(update(&mut app, FlowEvent::ResendRequested).is_empty());
        assert_eq!(app.otp.countdown().remaining(), 2);
        assert!(app.take_notifications().is_empty());

        update(&mut app, FlowEvent::Tick { id });
        let effects = update(&mut app, FlowEvent::Tick { id });
        assert!(matches!(effects[..], [FlowEffect::StopCountdown]));
        let effects = update(&mut app, FlowEvent::ResendRequested);
        assert!(matches!(effects[..], [FlowEffect::ResendOtp]));

        let effects = update(&mut app, FlowEvent::OtpResent(Ok("OTP sent".to_string())));
        assert!(matches!(effects[..], [FlowEffect::StartCountdown { .. }]));
        assert_eq!(app.otp.countdown().remaining(), 3);
    }

    #[test]
    fn test_reopening_otp_ignores_ticks_of_previous_countdown() {
        let mut app = AppState::default();
        let stale = open_otp_screen(&mut app);
        let current = open_otp_screen(&mut app);
        assert_ne!(stale, current);

        assert!(update(&mut app, FlowEvent::Tick { id: stale }).is_empty());
        assert_eq!(app.otp.countdown().remaining(), 60);

        update(&mut app, FlowEvent::Tick { id: current });
        assert_eq!(app.otp.countdown().remaining(), 59);
    }

    #[test]
    fn test_zero_cooldown_opens_without_timer() {
        let mut app = AppState::new(0);
        let effects = update(
            &mut app,
            FlowEvent::OtpOpened {
                email: "a@b.com".to_string(),
            },
        );
        assert!(matches!(effects[..], [FlowEffect::StopCountdown]));
        assert!(app.otp.countdown().can_resend());
    }

    #[test]
    fn test_password_reset_submission() {
        let mut app = AppState::default();
        update(&mut app, FlowEvent::ForgotPasswordOpened);
        assert_eq!(app.screen, Screen::PasswordReset);

        update(&mut app, FlowEvent::ResetSubmitted);
        assert!(app.password_reset.error().is_some());
        assert!(app.take_notifications().is_empty());

        update(
            &mut app,
            FlowEvent::ResetEmailChanged("john@example.com".to_string()),
        );
        update(&mut app, FlowEvent::ResetSubmitted);
        assert_eq!(
            app.take_notifications(),
            vec![Notification::info(MSG_RESET_SUBMITTED)]
        );
    }

    #[test]
    fn test_compose_tagging() {
        let mut app = AppState::default();
        let alice = TaggedUser::new(1, "Alice Johnson", "alice_j");
        update(
            &mut app,
            FlowEvent::ComposeOpened {
                directory: vec![alice.clone(), TaggedUser::new(2, "Bob Smith", "bobsmith")],
            },
        );
        update(&mut app, FlowEvent::CaptionChanged("Sunset".to_string()));
        update(&mut app, FlowEvent::TagSearchChanged("bob".to_string()));
        update(&mut app, FlowEvent::TagToggled(alice));

        assert_eq!(app.screen, Screen::Compose);
        assert_eq!(app.post.caption(), "Sunset");
        assert_eq!(app.post.filtered().len(), 1);
        assert!(app.post.is_tagged(1));
    }

    #[test]
    fn test_rejected_images_raise_error_notifications() {
        let mut app = AppState::default();
        update(
            &mut app,
            FlowEvent::ImagesSelected(vec![
                ImageAttachment::new("beach.jpg", 2 * 1024 * 1024),
                ImageAttachment::new("pano.jpg", 11 * 1024 * 1024),
            ]),
        );
        assert_eq!(app.post.images().len(), 1);
        assert_eq!(
            app.take_notifications(),
            vec![Notification::error("pano.jpg is larger than 10MB")]
        );

        let batch = (0..5)
            .map(|i| ImageAttachment::new(format!("{i}.png"), 1))
            .collect();
        update(&mut app, FlowEvent::ImagesSelected(batch));
        assert_eq!(app.post.images().len(), 1);
        assert_eq!(
            app.take_notifications(),
            vec![Notification::error("You can only upload up to 5 images")]
        );

        update(&mut app, FlowEvent::ImageRemoved(0));
        assert!(app.post.images().is_empty());
    }

    #[test]
    fn test_teardown_discards_pending_check() {
        let mut app = AppState::default();
        let effects = update(
            &mut app,
            FlowEvent::FieldChanged {
                field: Field::Username,
                value: "john".to_string(),
            },
        );
        let Some(FlowEffect::ScheduleUsernameCheck { id, .. }) = effects.into_iter().next() else {
            panic!("expected a scheduled check");
        };

        let effects = update(&mut app, FlowEvent::Teardown);
        assert_eq!(effects.len(), 2);
        update(
            &mut app,
            FlowEvent::UsernameChecked {
                id,
                result: Ok(false),
            },
        );
        assert_eq!(app.signup.username_state(), &UsernameCheckState::Idle);
    }
}
