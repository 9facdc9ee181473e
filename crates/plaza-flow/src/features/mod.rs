//! Feature slices (state plus reducer helpers per screen).

pub mod otp;
pub mod password_reset;
pub mod post;
pub mod signup;
pub mod username;
