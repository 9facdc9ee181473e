//! Flow runtime: owns state, executes effects.
//!
//! This is the boundary where side effects happen. The reducer stays pure and
//! produces effects; this module executes them.
//!
//! ## Inbox Pattern
//!
//! Spawned work (debounce timers, HTTP calls, the countdown interval) reports
//! back by sending `FlowEvent`s to a single inbox. The owner of the runtime
//! pulls them with [`FlowRuntime::step`] or [`FlowRuntime::drain`], so every
//! state mutation happens on the owning task.
//!
//! ## Cancellation
//!
//! Every task runs under a child of one shutdown token. The username debounce
//! and the countdown additionally get their own token, replaced each time the
//! reducer reschedules them.

mod handlers;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use plaza_core::auth::AuthService;
use plaza_core::config::Config;
use plaza_core::session::{SessionStore, TOKEN_KEY};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::effects::FlowEffect;
use crate::events::FlowEvent;
use crate::features::otp::DEFAULT_COOLDOWN_SECS;
use crate::state::AppState;
use crate::update;

pub const MSG_NO_SESSION: &str = "No active session. Please sign up again.";

type FlowEventSender = mpsc::UnboundedSender<FlowEvent>;
type FlowEventReceiver = mpsc::UnboundedReceiver<FlowEvent>;

/// Timing knobs for the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Quiet period before a username check is sent.
    pub username_debounce: Duration,
    /// Countdown tick period.
    pub tick_interval: Duration,
    /// Seconds before an OTP resend is allowed.
    pub resend_cooldown_secs: u32,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            username_debounce: Duration::from_millis(Config::DEFAULT_DEBOUNCE_MS),
            tick_interval: Duration::from_secs(1),
            resend_cooldown_secs: DEFAULT_COOLDOWN_SECS,
        }
    }
}

impl RuntimeOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            username_debounce: config.username_debounce(),
            resend_cooldown_secs: config.otp.resend_cooldown_secs,
            ..Self::default()
        }
    }
}

/// Async runtime driving the flow reducer.
///
/// Must be created and used inside a tokio runtime. Dropping it tears it down.
pub struct FlowRuntime<A: AuthService, S: SessionStore> {
    /// Application state, mutated only through [`FlowRuntime::dispatch`].
    pub state: AppState,
    auth: Arc<A>,
    store: Arc<S>,
    options: RuntimeOptions,
    inbox_tx: Option<FlowEventSender>,
    inbox_rx: FlowEventReceiver,
    shutdown: CancellationToken,
    username_check: Option<CancellationToken>,
    countdown: Option<CancellationToken>,
}

impl<A: AuthService, S: SessionStore> FlowRuntime<A, S> {
    pub fn new(auth: Arc<A>, store: Arc<S>, options: RuntimeOptions) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(options.resend_cooldown_secs),
            auth,
            store,
            options,
            inbox_tx: Some(inbox_tx),
            inbox_rx,
            shutdown: CancellationToken::new(),
            username_check: None,
            countdown: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_torn_down(&self) -> bool {
        self.inbox_tx.is_none()
    }

    /// Runs the reducer on `event` and executes the resulting effects.
    ///
    /// Ignored after teardown.
    pub fn dispatch(&mut self, event: FlowEvent) {
        if self.is_torn_down() {
            return;
        }
        let effects = update::update(&mut self.state, event);
        self.execute_effects(effects);
    }

    /// Waits for the next inbox event and dispatches it.
    ///
    /// Returns false once the runtime has been torn down. Cancel-safe.
    pub async fn step(&mut self) -> bool {
        if self.is_torn_down() {
            return false;
        }
        match self.inbox_rx.recv().await {
            Some(event) => {
                self.dispatch(event);
                true
            }
            None => false,
        }
    }

    /// Dispatches every event already in the inbox without waiting.
    pub fn drain(&mut self) -> usize {
        let mut count = 0;
        while !self.is_torn_down() {
            let Ok(event) = self.inbox_rx.try_recv() else {
                break;
            };
            self.dispatch(event);
            count += 1;
        }
        count
    }

    /// Stops both timers, cancels in-flight work and closes the inbox.
    /// Results that arrive afterwards are dropped.
    pub fn teardown(&mut self) {
        if self.is_torn_down() {
            return;
        }
        self.dispatch(FlowEvent::Teardown);
        self.shutdown.cancel();
        self.inbox_tx = None;
        self.inbox_rx.close();
        tracing::debug!("flow runtime torn down");
    }

    fn execute_effects(&mut self, effects: Vec<FlowEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns a one-shot handler and sends its event (if any) to the inbox.
    ///
    /// The task is abandoned on shutdown; its result is never delivered.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Option<FlowEvent>> + Send + 'static,
    {
        let Some(tx) = self.inbox_tx.clone() else {
            return;
        };
        let shutdown = self.shutdown.child_token();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => {}
                event = f() => {
                    if let Some(event) = event {
                        let _ = tx.send(event);
                    }
                }
            }
        });
    }

    fn execute_effect(&mut self, effect: FlowEffect) {
        match effect {
            FlowEffect::ScheduleUsernameCheck { id, username } => {
                cancel(&mut self.username_check);
                let token = self.shutdown.child_token();
                self.username_check = Some(token.clone());
                let auth = Arc::clone(&self.auth);
                let delay = self.options.username_debounce;
                self.spawn_effect(move || {
                    handlers::username_check(auth, id, username, delay, token)
                });
            }
            FlowEffect::CancelUsernameCheck => cancel(&mut self.username_check),

            FlowEffect::Signup { request } => {
                let auth = Arc::clone(&self.auth);
                self.spawn_effect(move || handlers::signup(auth, request));
            }
            FlowEffect::PersistToken { token, email } => {
                let event = match self.store.set(TOKEN_KEY, &token) {
                    Ok(()) => FlowEvent::TokenPersisted { email },
                    Err(e) => {
                        tracing::warn!("failed to persist session token: {e:#}");
                        FlowEvent::StorageFailed(format!("Failed to save session: {e:#}"))
                    }
                };
                self.dispatch(event);
            }

            FlowEffect::StartCountdown { id } => {
                cancel(&mut self.countdown);
                let Some(tx) = self.inbox_tx.clone() else {
                    return;
                };
                let token = self.shutdown.child_token();
                self.countdown = Some(token.clone());
                tokio::spawn(handlers::countdown(
                    id,
                    self.options.tick_interval,
                    token,
                    tx,
                ));
            }
            FlowEffect::StopCountdown => cancel(&mut self.countdown),

            FlowEffect::VerifyOtp { email, otp } => match self.session_token() {
                Ok(token) => {
                    let auth = Arc::clone(&self.auth);
                    self.spawn_effect(move || handlers::verify_otp(auth, email, otp, token));
                }
                Err(message) => self.dispatch(FlowEvent::OtpVerified(Err(message))),
            },
            FlowEffect::ResendOtp => match self.session_token() {
                Ok(token) => {
                    let auth = Arc::clone(&self.auth);
                    self.spawn_effect(move || handlers::resend_otp(auth, token));
                }
                Err(message) => self.dispatch(FlowEvent::OtpResent(Err(message))),
            },
        }
    }

    /// Reads the bearer token; failures become the user-facing message.
    fn session_token(&self) -> Result<String, String> {
        match self.store.get(TOKEN_KEY) {
            Ok(Some(token)) if !token.is_empty() => Ok(token),
            Ok(_) => Err(MSG_NO_SESSION.to_string()),
            Err(e) => {
                tracing::warn!("failed to read session token: {e:#}");
                Err(format!("Failed to read session: {e:#}"))
            }
        }
    }
}

impl<A: AuthService, S: SessionStore> Drop for FlowRuntime<A, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn cancel(slot: &mut Option<CancellationToken>) {
    if let Some(token) = slot.take() {
        token.cancel();
    }
}
