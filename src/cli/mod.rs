//! CLI command handlers. Each subcommand builds an [`ApiClient`] over the
//! shared file-backed session and talks to the TalkToText REST API.

pub mod args;
pub mod auth;
pub mod dashboard;
pub mod meetings;
pub mod profile;
pub mod tasks;
pub mod upload;

pub use args::{Cli, CliCommand};
pub use auth::handle_auth_command;
pub use dashboard::handle_stats_command;
pub use meetings::handle_meetings_command;
pub use profile::handle_profile_command;
pub use tasks::handle_tasks_command;
pub use upload::handle_upload_command;

use anyhow::Result;
use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::Config;
use crate::session::{FileTokenStore, Session};

/// Client wired to the stored session. On auth failure the hook tells the
/// user how to sign back in; the failing command then errors out normally.
pub fn build_client(config: &Config) -> Result<Arc<ApiClient>> {
    let store = Arc::new(FileTokenStore::default_location()?);
    let session = Session::new(store).with_unauthorized_hook(Arc::new(|| {
        eprintln!("Your session has expired. Run `ttt auth login` to sign in again.");
    }));
    Ok(Arc::new(ApiClient::new(&config.api.base_url, session)))
}
