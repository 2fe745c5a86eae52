use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use ttt::{
    cli::{
        handle_auth_command, handle_meetings_command, handle_profile_command,
        handle_stats_command, handle_tasks_command, handle_upload_command, Cli, CliCommand,
    },
    config::Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if let CliCommand::Version = cli.command {
        println!("ttt {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = Config::load()?;

    match cli.command {
        CliCommand::Upload(args) => handle_upload_command(args, &config).await,
        CliCommand::Meetings(args) => handle_meetings_command(args, &config).await,
        CliCommand::Tasks(args) => handle_tasks_command(args, &config).await,
        CliCommand::Stats => handle_stats_command(&config).await,
        CliCommand::Profile(args) => handle_profile_command(args, &config).await,
        CliCommand::Auth(args) => handle_auth_command(args, &config).await,
        CliCommand::Version => unreachable!("handled above"),
    }
}
