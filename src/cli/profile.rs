//! CLI handlers for profile CRUD and avatar upload.

use anyhow::{bail, Result};
use dialoguer::Confirm;
use std::path::Path;

use crate::api::types::ProfileUpdate;
use crate::cli::args::{ProfileCliArgs, ProfileCommand};
use crate::cli::build_client;
use crate::config::Config;

pub async fn handle_profile_command(args: ProfileCliArgs, config: &Config) -> Result<()> {
    match args.command {
        ProfileCommand::Show => show_profile(config).await,
        ProfileCommand::Update {
            first_name,
            last_name,
            company,
            job_title,
        } => {
            update_profile(
                config,
                ProfileUpdate {
                    first_name,
                    last_name,
                    company,
                    job_title,
                },
            )
            .await
        }
        ProfileCommand::Avatar { file } => upload_avatar(config, &file).await,
        ProfileCommand::Delete { yes } => delete_account(config, yes).await,
    }
}

async fn show_profile(config: &Config) -> Result<()> {
    let client = build_client(config)?;
    let profile = client.profile().await?;

    println!("Username:  {}", profile.username);
    let name = [profile.first_name.as_deref(), profile.last_name.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    if !name.is_empty() {
        println!("Name:      {}", name);
    }
    if let Some(company) = &profile.company {
        println!("Company:   {}", company);
    }
    if let Some(job_title) = &profile.job_title {
        println!("Job title: {}", job_title);
    }
    if let Some(avatar_url) = &profile.avatar_url {
        println!("Avatar:    {}", avatar_url);
    }

    Ok(())
}

async fn update_profile(config: &Config, update: ProfileUpdate) -> Result<()> {
    if update.first_name.is_none()
        && update.last_name.is_none()
        && update.company.is_none()
        && update.job_title.is_none()
    {
        bail!("Nothing to update. Pass at least one of --first-name, --last-name, --company, --job-title.");
    }

    let client = build_client(config)?;
    let profile = client.update_profile(&update).await?;
    println!("Profile updated for {}.", profile.username);

    Ok(())
}

async fn upload_avatar(config: &Config, file: &Path) -> Result<()> {
    if !file.is_file() {
        bail!("Avatar file not found: {:?}", file);
    }

    let client = build_client(config)?;
    let profile = client.upload_avatar(file).await?;
    match profile.avatar_url {
        Some(url) => println!("Avatar updated: {}", url),
        None => println!("Avatar updated."),
    }

    Ok(())
}

async fn delete_account(config: &Config, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Permanently delete your account and all meetings?")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let client = build_client(config)?;
    client.delete_account().await?;
    client.session().clear();
    println!("Account deleted.");

    Ok(())
}
