//! Account Service - command-line access to credential workflows.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use account_service_lib::service::AccountService;
use common::{AppError, AppResult, CredentialConfig};
use domain::{NewUser, UserResponse};

#[derive(Parser)]
#[command(name = "account-service")]
#[command(about = "Password strength, hashing and user registration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a password meets the strength rules
    Strength { password: String },
    /// Hash a password with the configured algorithm
    Hash { password: String },
    /// Verify a password against an encoded hash
    Verify { password: String, hash: String },
    /// Validate input and build a user record with a hashed password
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "ACCOUNT_PASSWORD")]
        password: String,
        #[arg(long)]
        bio: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            error!(code = e.code(), "{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> AppResult<ExitCode> {
    let config = CredentialConfig::from_env();

    match command {
        Commands::Strength { password } => {
            let credentials = account_service_lib::credential_service(&config)?;
            if credentials.is_password_strong(password.as_str()) {
                println!("strong");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("weak");
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Hash { password } => {
            let credentials = account_service_lib::credential_service(&config)?;
            println!("{}", credentials.encode_password(&password)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Verify { password, hash } => {
            let credentials = account_service_lib::credential_service(&config)?;
            if credentials.matches(&password, &hash) {
                println!("match");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("no match");
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Register {
            username,
            email,
            password,
            bio,
        } => {
            let accounts = account_service_lib::account_manager(&config)?;
            let record = accounts
                .register(NewUser {
                    username,
                    email,
                    password,
                    bio,
                })
                .await?;

            let json = serde_json::to_string_pretty(&UserResponse::from(&record))
                .map_err(|e| AppError::internal(e.to_string()))?;
            println!("{}", json);
            Ok(ExitCode::SUCCESS)
        }
    }
}
