//! CLI handlers for meeting history, detail, sharing, and deletion.

use anyhow::{bail, Result};
use dialoguer::Confirm;

use crate::api::types::ShareEmailRequest;
use crate::cli::args::{MeetingsCliArgs, MeetingsCommand};
use crate::cli::build_client;
use crate::config::Config;

pub async fn handle_meetings_command(args: MeetingsCliArgs, config: &Config) -> Result<()> {
    match args.command {
        MeetingsCommand::List { limit } => list_meetings(config, limit).await,
        MeetingsCommand::Show { id } => show_meeting(config, id).await,
        MeetingsCommand::Delete { id, yes } => delete_meeting(config, id, yes).await,
        MeetingsCommand::Share { id, to, message } => share_meeting(config, id, &to, message).await,
    }
}

async fn list_meetings(config: &Config, limit: usize) -> Result<()> {
    let client = build_client(config)?;
    let meetings = client.meetings().await?;

    if meetings.is_empty() {
        println!("No meetings yet. Upload a recording with `ttt upload <FILE>`.");
        return Ok(());
    }

    for meeting in meetings.iter().take(limit) {
        let created = format_timestamp(&meeting.created_at);
        println!("#{} {} - {}", meeting.id, meeting.title, created);
    }

    Ok(())
}

async fn show_meeting(config: &Config, id: i64) -> Result<()> {
    let client = build_client(config)?;
    let meeting = client.meeting(id).await?;

    println!("Meeting #{}: {}", meeting.id, meeting.title);
    println!("Created: {}", format_timestamp(&meeting.created_at));

    if !meeting.notes.is_empty() {
        println!("\n--- Notes ---\n{}", meeting.notes);
    }
    if !meeting.transcript.is_empty() {
        println!("\n--- Transcript ---\n{}", meeting.transcript);
    }

    Ok(())
}

async fn delete_meeting(config: &Config, id: i64, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete meeting #{}? This cannot be undone", id))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let client = build_client(config)?;
    client.delete_meeting(id).await?;
    println!("Meeting #{} deleted.", id);

    Ok(())
}

async fn share_meeting(
    config: &Config,
    id: i64,
    recipient: &str,
    message: Option<String>,
) -> Result<()> {
    if !super::auth::is_valid_email(recipient) {
        bail!("\"{}\" does not look like an email address", recipient);
    }

    let client = build_client(config)?;
    let response = client
        .share_meeting_by_email(
            id,
            &ShareEmailRequest {
                recipient_email: recipient.to_string(),
                message,
            },
        )
        .await?;
    println!("{}", response.message);

    Ok(())
}

/// Render the server's ISO-8601 timestamp in local time, or pass it through
/// untouched if it does not parse.
fn format_timestamp(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|_| raw.to_string())
}
