//! CLI handlers for session and account management.
//!
//! `/login/{provider}` is a browser OAuth redirect, so `login` prints the
//! provider URL and accepts the token pasted back from the callback page.

use anyhow::{bail, Context, Result};
use dialoguer::{Input, Password};
use regex::Regex;

use crate::api::types::{
    ForgotPasswordRequest, ResetPasswordRequest, SignupRequest, VerifyEmailRequest,
};
use crate::cli::args::{AuthCliArgs, AuthCommand};
use crate::cli::build_client;
use crate::config::Config;

pub async fn handle_auth_command(args: AuthCliArgs, config: &Config) -> Result<()> {
    match args.command {
        AuthCommand::Login { token, provider } => login(config, token, &provider).await,
        AuthCommand::Logout => logout(config),
        AuthCommand::Signup { email, name } => signup(config, &email, &name).await,
        AuthCommand::VerifyEmail { email, code } => verify_email(config, &email, &code).await,
        AuthCommand::ForgotPassword { email } => forgot_password(config, &email).await,
        AuthCommand::ResetPassword { token } => reset_password(config, &token).await,
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    // Same loose shape the signup form checks; the server does the real
    // validation.
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

fn validate_password(password: &str) -> Result<()> {
    if password.len() < 8 {
        bail!("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase())
        || !password.chars().any(|c| c.is_ascii_lowercase())
        || !password.chars().any(|c| c.is_ascii_digit())
    {
        bail!("Password must contain an uppercase letter, a lowercase letter, and a number");
    }
    Ok(())
}

async fn login(config: &Config, token: Option<String>, provider: &str) -> Result<()> {
    let client = build_client(config)?;

    let token = match token {
        Some(token) => token,
        None => {
            println!("Open this URL in your browser to sign in:");
            println!("  {}", client.login_url(provider));
            println!("After the redirect, copy the token from the callback URL.");
            Input::<String>::new()
                .with_prompt("Token")
                .interact_text()
                .context("Failed to read token")?
        }
    };

    let token = token.trim();
    if token.is_empty() {
        bail!("No token provided");
    }

    client.session().save_token(token)?;

    // Prove the token works before claiming success.
    let profile = client.profile().await.context("Token was not accepted")?;
    println!("Signed in as {}", profile.username);

    Ok(())
}

fn logout(config: &Config) -> Result<()> {
    let client = build_client(config)?;
    client.session().clear();
    println!("Signed out.");
    Ok(())
}

async fn signup(config: &Config, email: &str, name: &str) -> Result<()> {
    if !is_valid_email(email) {
        bail!("\"{}\" does not look like an email address", email);
    }

    let password = Password::new()
        .with_prompt("Choose a password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .context("Failed to read password")?;
    validate_password(&password)?;

    let client = build_client(config)?;
    client
        .signup(&SignupRequest {
            username: email.to_string(),
            password,
            full_name: name.to_string(),
        })
        .await?;

    println!("Account created. Check {} for a verification code, then run:", email);
    println!("  ttt auth verify-email --email {} --code <CODE>", email);

    Ok(())
}

async fn verify_email(config: &Config, email: &str, code: &str) -> Result<()> {
    let client = build_client(config)?;
    let response = client
        .verify_email(&VerifyEmailRequest {
            email: email.to_string(),
            code: code.to_string(),
        })
        .await?;
    println!("{}", response.message);
    Ok(())
}

async fn forgot_password(config: &Config, email: &str) -> Result<()> {
    if !is_valid_email(email) {
        bail!("\"{}\" does not look like an email address", email);
    }

    let client = build_client(config)?;
    let response = client
        .forgot_password(&ForgotPasswordRequest {
            email: email.to_string(),
        })
        .await?;
    println!("{}", response.message);
    Ok(())
}

async fn reset_password(config: &Config, token: &str) -> Result<()> {
    let password = Password::new()
        .with_prompt("New password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .context("Failed to read password")?;
    validate_password(&password)?;

    let client = build_client(config)?;
    let response = client
        .reset_password(&ResetPasswordRequest {
            token: token.to_string(),
            password,
        })
        .await?;
    println!("{}", response.message);
    Ok(())
}
