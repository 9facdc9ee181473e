//! Signup command handlers.

use anyhow::{Result, bail};
use plaza_core::config::Config;
use plaza_flow::features::signup::Field;
use plaza_flow::features::username::UsernameCheckState;
use plaza_flow::{FlowEvent, Route, RuntimeOptions};

use super::{CliRuntime, flow_runtime, flush_notifications};

pub struct SignupArgs {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Feeds `username` through the debounced check and waits for the outcome.
async fn resolve_username(rt: &mut CliRuntime, username: &str) -> UsernameCheckState {
    rt.dispatch(FlowEvent::FieldChanged {
        field: Field::Username,
        value: username.to_string(),
    });
    while *rt.state.signup.username_state() == UsernameCheckState::Checking {
        if !rt.step().await {
            break;
        }
    }
    rt.state.signup.username_state().clone()
}

pub async fn check_username(config: &Config, username: &str) -> Result<()> {
    let mut rt = flow_runtime(config, RuntimeOptions::from_config(config))?;
    let state = resolve_username(&mut rt, username).await;
    rt.teardown();

    match state {
        UsernameCheckState::Available => {
            println!("Username available!");
            Ok(())
        }
        UsernameCheckState::Unavailable(reason) | UsernameCheckState::Invalid(reason) => {
            bail!(reason)
        }
        UsernameCheckState::Idle | UsernameCheckState::Checking => {
            bail!("Username is required")
        }
    }
}

pub async fn run(config: &Config, args: SignupArgs) -> Result<()> {
    let mut rt = flow_runtime(config, RuntimeOptions::from_config(config))?;
    resolve_username(&mut rt, &args.username).await;

    for (field, value) in [
        (Field::Email, args.email),
        (Field::Password, args.password),
        (Field::ConfirmPassword, args.confirm_password),
    ] {
        rt.dispatch(FlowEvent::FieldChanged { field, value });
    }

    rt.dispatch(FlowEvent::SubmitSignup);
    if !rt.state.signup.is_submitting() {
        let mut problems: Vec<String> = rt
            .state
            .signup
            .errors()
            .iter()
            .filter_map(|(field, error)| {
                error
                    .as_ref()
                    .map(|message| format!("{}: {message}", field.label()))
            })
            .collect();
        if problems.is_empty() {
            problems.push(format!("{}: Username is required", Field::Username.label()));
        }
        rt.teardown();
        bail!("Signup not submitted:\n  {}", problems.join("\n  "));
    }

    while rt.state.signup.is_submitting() {
        if !rt.step().await {
            break;
        }
    }

    let route = rt.state.take_navigation();
    let error = flush_notifications(&mut rt.state);
    rt.teardown();

    match route {
        Some(Route::Otp { email }) => {
            println!("Verification code sent to {email}.");
            println!("Run `plaza otp --email {email}` to verify.");
            Ok(())
        }
        None => bail!(error.unwrap_or_else(|| "Signup failed".to_string())),
    }
}
