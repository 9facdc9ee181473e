//! Plaza client flows: signup with live username checks, OTP verification,
//! password reset and post composition.
//!
//! Architecture:
//! - `state`: `AppState`, the single owner of flow state
//! - `events`: inputs to the reducer (user input and async results)
//! - `effects`: side effects the reducer asks the runtime to perform
//! - `update`: the reducer, the only place state is mutated
//! - `runtime`: executes effects (timers, HTTP, token storage) and feeds
//!   results back through the inbox
//! - `features`: per-screen state slices and their reducers

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod runtime;
pub mod state;
pub mod update;

pub use effects::FlowEffect;
pub use events::FlowEvent;
pub use runtime::{FlowRuntime, RuntimeOptions};
pub use state::{AppState, Notification, NotificationLevel, Route, Screen};
