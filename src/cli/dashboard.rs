//! CLI handler for the dashboard metrics.

use anyhow::Result;

use crate::cli::build_client;
use crate::config::Config;

pub async fn handle_stats_command(config: &Config) -> Result<()> {
    let client = build_client(config)?;

    let stats = client.dashboard_stats().await?;
    println!("Meetings processed: {}", stats.total_meetings);
    println!("Hours processed:    {:.1}", stats.hours_processed);
    println!("Team members:       {}", stats.team_members);
    println!("Accuracy rate:      {:.1}%", stats.accuracy_rate);

    // The remaining charts are secondary; a failure on one should not hide
    // the headline numbers.
    match client.weekly_activity().await {
        Ok(activity) if !activity.is_empty() => {
            println!("\nWeekly activity:");
            for day in &activity {
                println!("  {:<10} {}", day.day, "#".repeat(day.meetings.max(0) as usize));
            }
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("Could not fetch weekly activity: {}", e),
    }

    match client.meeting_types().await {
        Ok(types) if !types.is_empty() => {
            println!("\nMeeting types:");
            for t in &types {
                println!("  {:<20} {}", t.name, t.value);
            }
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("Could not fetch meeting types: {}", e),
    }

    match client.processing_speed().await {
        Ok(speed) if !speed.is_empty() => {
            println!("\nProcessing speed:");
            for point in &speed {
                println!("  {:<10} {}", point.time, point.count);
            }
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("Could not fetch processing speed: {}", e),
    }

    Ok(())
}
