//! Flow events: user input plus results reported by the runtime.
//!
//! Async results carry `Result<_, String>`; the error string is the message
//! shown to the user.

use plaza_core::auth::SignupResponse;

use crate::common::RequestId;
use crate::features::post::{ImageAttachment, TaggedUser};
use crate::features::signup::Field;

#[derive(Debug)]
pub enum FlowEvent {
    // Signup
    FieldChanged { field: Field, value: String },
    SubmitSignup,
    /// `Ok(user_exists)` or the failure message.
    UsernameChecked {
        id: RequestId,
        result: Result<bool, String>,
    },
    SignupFinished(Result<SignupResponse, String>),
    TokenPersisted { email: String },
    StorageFailed(String),

    // OTP
    OtpOpened { email: String },
    OtpInput(String),
    VerifyRequested,
    /// `Ok(server message)` or the failure message.
    OtpVerified(Result<String, String>),
    ResendRequested,
    OtpResent(Result<String, String>),
    /// One countdown second, tagged with the countdown that produced it.
    Tick { id: RequestId },

    // Password reset
    ForgotPasswordOpened,
    ResetEmailChanged(String),
    ResetSubmitted,

    // Post composer
    ComposeOpened { directory: Vec<TaggedUser> },
    CaptionChanged(String),
    TagSearchChanged(String),
    TagToggled(TaggedUser),
    ImagesSelected(Vec<ImageAttachment>),
    ImageRemoved(usize),

    /// Stop all timers and make in-flight results no-ops.
    Teardown,
}
