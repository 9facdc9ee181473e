//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use plaza_core::{config, logging};

mod commands;

#[derive(Parser)]
#[command(name = "plaza")]
#[command(version)]
#[command(about = "Plaza account signup and email verification")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Check whether a username is available
    CheckUsername {
        /// Username to check
        #[arg(value_name = "USERNAME")]
        username: String,
    },

    /// Create an account and store the session token
    Signup {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long, env = "PLAZA_PASSWORD", hide_env_values = true)]
        password: String,

        /// Password confirmation (defaults to --password)
        #[arg(long)]
        confirm_password: Option<String>,
    },

    /// Verify the emailed one-time code
    Verify {
        #[arg(long)]
        email: String,

        /// 6-digit code
        #[arg(long)]
        otp: String,
    },

    /// Request a new one-time code
    ResendOtp,

    /// Interactive verification with the resend countdown
    Otp {
        #[arg(long)]
        email: String,
    },

    /// Request a password reset email
    ForgotPassword {
        #[arg(long)]
        email: String,
    },

    /// Clear the stored session token
    Logout,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = match logging::init(cli.log_level.as_deref()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: logging disabled: {e:#}");
            None
        }
    };

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = config::Config::load().context("load config")?;

    match cli.command {
        Commands::CheckUsername { username } => {
            commands::signup::check_username(&config, &username).await
        }
        Commands::Signup {
            username,
            email,
            password,
            confirm_password,
        } => {
            let confirm_password = confirm_password.unwrap_or_else(|| password.clone());
            commands::signup::run(
                &config,
                commands::signup::SignupArgs {
                    username,
                    email,
                    password,
                    confirm_password,
                },
            )
            .await
        }
        Commands::Verify { email, otp } => commands::otp::verify(&config, &email, &otp).await,
        Commands::ResendOtp => commands::otp::resend(&config).await,
        Commands::Otp { email } => commands::otp::interactive(&config, &email).await,
        Commands::ForgotPassword { email } => commands::password::forgot(&email),
        Commands::Logout => commands::session::logout(),

        Commands::Config { command } => match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
