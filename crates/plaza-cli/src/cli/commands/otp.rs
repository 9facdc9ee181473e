//! OTP command handlers.

use anyhow::{Context, Result, bail};
use plaza_core::config::Config;
use plaza_flow::features::otp::{OtpScreen, format_remaining};
use plaza_flow::{FlowEvent, RuntimeOptions};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{CliRuntime, flow_runtime, flush_notifications};

/// How often the interactive countdown is reprinted, in seconds.
const COUNTDOWN_PRINT_EVERY: u32 = 15;

async fn wait_while(rt: &mut CliRuntime, busy: impl Fn(&OtpScreen) -> bool) {
    while busy(&rt.state.otp) {
        if !rt.step().await {
            break;
        }
    }
}

fn finish(mut rt: CliRuntime) -> Result<()> {
    let error = flush_notifications(&mut rt.state);
    rt.teardown();
    match error {
        Some(message) => bail!(message),
        None => Ok(()),
    }
}

pub async fn verify(config: &Config, email: &str, otp: &str) -> Result<()> {
    let mut rt = flow_runtime(config, RuntimeOptions::from_config(config))?;
    rt.dispatch(FlowEvent::OtpOpened {
        email: email.to_string(),
    });
    rt.dispatch(FlowEvent::OtpInput(otp.to_string()));
    rt.dispatch(FlowEvent::VerifyRequested);
    wait_while(&mut rt, OtpScreen::is_verifying).await;
    finish(rt)
}

/// One-shot resend. The cooldown can't be tracked across invocations, so the
/// server is left to enforce it.
pub async fn resend(config: &Config) -> Result<()> {
    let options = RuntimeOptions {
        resend_cooldown_secs: 0,
        ..RuntimeOptions::from_config(config)
    };
    let mut rt = flow_runtime(config, options)?;
    rt.dispatch(FlowEvent::OtpOpened {
        email: String::new(),
    });
    rt.dispatch(FlowEvent::ResendRequested);
    wait_while(&mut rt, OtpScreen::is_resending).await;
    finish(rt)
}

fn print_countdown(screen: &OtpScreen) {
    let countdown = screen.countdown();
    if countdown.can_resend() {
        println!("Didn't receive a code? Type `r` to resend.");
    } else {
        println!(
            "Didn't receive a code? Resend available in {}.",
            format_remaining(countdown.remaining())
        );
    }
}

/// Reads codes from stdin until one verifies, `q` is typed or input ends.
pub async fn interactive(config: &Config, email: &str) -> Result<()> {
    let mut rt = flow_runtime(config, RuntimeOptions::from_config(config))?;
    rt.dispatch(FlowEvent::OtpOpened {
        email: email.to_string(),
    });

    println!("Enter the 6-digit code sent to {email} (`r` to resend, `q` to quit).");
    print_countdown(&rt.state.otp);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_remaining = rt.state.otp.countdown().remaining();

    loop {
        let was_verifying = rt.state.otp.is_verifying();

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("read stdin")? else {
                    break;
                };
                match line.trim() {
                    "q" => break,
                    "" => print_countdown(&rt.state.otp),
                    "r" => {
                        if rt.state.otp.countdown().can_resend() {
                            rt.dispatch(FlowEvent::ResendRequested);
                        } else {
                            print_countdown(&rt.state.otp);
                        }
                    }
                    code => {
                        rt.dispatch(FlowEvent::OtpInput(code.to_string()));
                        rt.dispatch(FlowEvent::VerifyRequested);
                    }
                }
            }
            alive = rt.step() => {
                if !alive {
                    break;
                }
            }
        }

        let remaining = rt.state.otp.countdown().remaining();
        if remaining != last_remaining {
            if remaining == 0 || remaining % COUNTDOWN_PRINT_EVERY == 0 {
                print_countdown(&rt.state.otp);
            }
            last_remaining = remaining;
        }

        let error = flush_notifications(&mut rt.state);
        if let Some(message) = &error {
            eprintln!("{message}");
        }
        if was_verifying && !rt.state.otp.is_verifying() && error.is_none() {
            break;
        }
    }

    // A code typed right before quitting or EOF still gets its answer.
    if rt.state.otp.is_verifying() {
        wait_while(&mut rt, OtpScreen::is_verifying).await;
        if let Some(message) = flush_notifications(&mut rt.state) {
            eprintln!("{message}");
        }
    }

    rt.teardown();
    Ok(())
}
