use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ttt")]
#[command(about = "TalkToText: meeting recordings in, structured notes out", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Upload recordings and track processing until notes are ready
    Upload(UploadCliArgs),
    /// List, inspect, share, or delete processed meetings
    Meetings(MeetingsCliArgs),
    /// Inspect or cancel in-flight processing tasks
    Tasks(TasksCliArgs),
    /// Show dashboard metrics
    Stats,
    /// View or edit your profile
    Profile(ProfileCliArgs),
    /// Sign in/out and manage your account
    Auth(AuthCliArgs),
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug)]
pub struct UploadCliArgs {
    /// Audio/video recordings to upload
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct MeetingsCliArgs {
    #[command(subcommand)]
    pub command: MeetingsCommand,
}

#[derive(Subcommand, Debug)]
pub enum MeetingsCommand {
    /// List processed meetings
    List {
        /// Maximum number of meetings to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show a meeting's transcript and notes
    Show { id: i64 },
    /// Delete a meeting
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Email the meeting notes to someone
    Share {
        id: i64,
        /// Recipient email address
        #[arg(long)]
        to: String,
        /// Optional note to include
        #[arg(short, long)]
        message: Option<String>,
    },
}

#[derive(ClapArgs, Debug)]
pub struct TasksCliArgs {
    #[command(subcommand)]
    pub command: TasksCommand,
}

#[derive(Subcommand, Debug)]
pub enum TasksCommand {
    /// List tasks the server is still processing
    List,
    /// Cancel an in-flight task
    Cancel { task_id: String },
}

#[derive(ClapArgs, Debug)]
pub struct ProfileCliArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Show your profile
    Show,
    /// Update profile fields
    Update {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        job_title: Option<String>,
    },
    /// Upload a new avatar image
    Avatar { file: PathBuf },
    /// Permanently delete your account
    Delete {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(ClapArgs, Debug)]
pub struct AuthCliArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Sign in with an OAuth provider token
    Login {
        /// Bearer token obtained from the browser OAuth flow
        #[arg(long)]
        token: Option<String>,
        /// OAuth provider to sign in with
        #[arg(long, default_value = "google")]
        provider: String,
    },
    /// Forget the stored session token
    Logout,
    /// Create an account
    Signup {
        /// Email address (used as the account username)
        #[arg(long)]
        email: String,
        /// Full name shown on your profile
        #[arg(long)]
        name: String,
    },
    /// Confirm the signup code sent to your email
    VerifyEmail {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
    },
    /// Request a password reset link
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password using a reset token
    ResetPassword {
        /// Reset token from the email link
        #[arg(long)]
        token: String,
    },
}
