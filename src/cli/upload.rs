//! CLI handler for the upload command.
//!
//! Wires the upload tracker to indicatif bars: tracker events set the
//! smoother targets, a short fixed tick walks the displayed positions toward
//! them. The command finishes once every job is terminal and every bar has
//! caught up with its target.

use anyhow::{bail, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::api::ApiError;
use crate::cli::args::UploadCliArgs;
use crate::cli::build_client;
use crate::config::Config;
use crate::upload::{
    ApiTaskBackend, JobEvent, JobStatus, ProgressSmoother, TrackerTiming, UploadLimits,
    UploadTracker,
};

pub async fn handle_upload_command(args: UploadCliArgs, config: &Config) -> Result<()> {
    let client = build_client(config)?;
    let backend = Arc::new(ApiTaskBackend::new(client.clone()));
    let (tracker, mut events) = UploadTracker::new(
        backend,
        UploadLimits::from_config(&config.upload),
        TrackerTiming::from_config(&config.upload),
    );

    // Pick up tasks still processing from a previous invocation.
    match tracker.sync_ongoing().await {
        Ok(()) => {}
        Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized.into()),
        Err(e) => warn!("Could not fetch ongoing tasks: {}", e),
    }

    tracker.handle_drop(&args.files);

    let multi = MultiProgress::new();
    let style = ProgressStyle::with_template("{prefix:>24} [{bar:32}] {pos:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");

    let mut bars: HashMap<String, (ProgressBar, ProgressSmoother)> = HashMap::new();
    let mut ready_meetings: Vec<i64> = Vec::new();
    let mut ticker = tokio::time::interval(config.upload.smoother_tick());

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    JobEvent::Updated(job) => {
                        let (bar, smoother) = bars.entry(job.id.clone()).or_insert_with(|| {
                            let bar = multi.add(ProgressBar::new(100));
                            bar.set_style(style.clone());
                            (bar, ProgressSmoother::new())
                        });
                        bar.set_prefix(job.file.name.clone());
                        bar.set_message(job.details.clone());
                        smoother.set_target(job.progress);
                        if job.status == JobStatus::Completed {
                            smoother.set_target(100);
                        }
                    }
                    JobEvent::Renamed { from, to } => {
                        if let Some(entry) = bars.remove(&from) {
                            bars.insert(to, entry);
                        }
                    }
                    JobEvent::Removed { id } => {
                        if let Some((bar, _)) = bars.remove(&id) {
                            bar.finish_and_clear();
                        }
                    }
                    JobEvent::Navigate { meeting_id } => {
                        ready_meetings.push(meeting_id);
                    }
                }
            }
            _ = ticker.tick() => {
                for (bar, smoother) in bars.values_mut() {
                    bar.set_position(smoother.tick() as u64);
                }
                if tracker.is_settled() && bars.values().all(|(_, s)| s.settled()) {
                    break;
                }
            }
        }
    }

    for (bar, _) in bars.values() {
        if !bar.is_finished() {
            bar.finish();
        }
    }

    for meeting_id in &ready_meetings {
        match client.meeting(*meeting_id).await {
            Ok(meeting) => {
                println!("\nMeeting #{} ready: {}", meeting.id, meeting.title);
                println!("  View it with: ttt meetings show {}", meeting.id);
            }
            Err(e) => warn!("Could not fetch meeting {}: {}", meeting_id, e),
        }
    }

    let failures: Vec<_> = tracker
        .jobs()
        .into_iter()
        .filter(|j| j.status == JobStatus::Error)
        .collect();
    if !failures.is_empty() {
        eprintln!();
        for job in &failures {
            eprintln!("  {}: {}", job.file.name, job.details);
        }
        bail!("{} file(s) failed", failures.len());
    }

    Ok(())
}
