//! CLI handlers for in-flight processing tasks.

use anyhow::Result;

use crate::cli::args::{TasksCliArgs, TasksCommand};
use crate::cli::build_client;
use crate::config::Config;
use crate::upload::JobStatus;

pub async fn handle_tasks_command(args: TasksCliArgs, config: &Config) -> Result<()> {
    match args.command {
        TasksCommand::List => list_tasks(config).await,
        TasksCommand::Cancel { task_id } => cancel_task(config, &task_id).await,
    }
}

async fn list_tasks(config: &Config) -> Result<()> {
    let client = build_client(config)?;
    let tasks = client.ongoing_tasks().await?;

    if tasks.is_empty() {
        println!("No tasks in progress.");
        return Ok(());
    }

    for task in &tasks {
        let status = JobStatus::from_wire(&task.status);
        println!(
            "{} {} [{}] {}%",
            task.task_id,
            task.filename,
            status.as_str(),
            task.progress_percent
        );
        if let Some(details) = &task.details {
            println!("  {}", details);
        }
    }

    Ok(())
}

async fn cancel_task(config: &Config, task_id: &str) -> Result<()> {
    let client = build_client(config)?;
    client.delete_task(task_id).await?;
    println!("Task {} cancelled.", task_id);
    Ok(())
}
