mod leaderboard;
mod status;
mod submit;
mod week;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use leohunt::models::HuntConfig;
use leohunt::{Hunt, HuntError};
use tracing::error;

#[derive(Parser)]
#[command(name = "leohunt")]
#[command(about = "Weekly coordinate hunt", long_about = None)]
pub struct Cli {
    /// Directory holding state.json and submissions.jsonl.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Caller is an authorized organiser.
    #[arg(long, global = true)]
    pub admin: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a new week and clear the target (admin).
    StartWeek {
        /// e.g. week-2 or 2026-01-05
        week_id: String,
    },
    /// Set this week's hidden target in DMS (admin).
    SetTarget {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        dms: Vec<String>,
    },
    /// Submit a guess in DMS.
    Submit {
        #[arg(long)]
        user: u64,
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        coords: Vec<String>,
    },
    /// Show the ranking for the current week (admin).
    Leaderboard {
        /// How many rows (max 100).
        #[arg(long, allow_negative_numbers = true)]
        top: Option<i64>,
    },
    /// Show the current week and attempts used.
    Status {
        #[arg(long)]
        user: Option<u64>,
    },
    /// Print the rules panel.
    Panel,
    /// Health check.
    Ping,
}

pub struct Session {
    pub config: HuntConfig,
    pub admin: bool,
}

impl Session {
    pub fn open_hunt(&self) -> Hunt {
        Hunt::open(&self.config).unwrap_or_else(|e| fail(&e))
    }

    pub fn require_admin(&self) {
        if !self.admin {
            eprintln!("Admins only.");
            std::process::exit(1);
        }
    }
}

pub fn run(cli: Cli) {
    let mut config = HuntConfig::load();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let session = Session {
        config,
        admin: cli.admin,
    };

    match cli.command {
        None => status::show_status(&session, None),
        Some(Commands::StartWeek { week_id }) => week::start_week(&session, &week_id),
        Some(Commands::SetTarget { dms }) => week::set_target(&session, &dms.join(" ")),
        Some(Commands::Submit { user, coords }) => {
            submit::submit_guess(&session, user, &coords.join(" "))
        }
        Some(Commands::Leaderboard { top }) => leaderboard::show_leaderboard(&session, top),
        Some(Commands::Status { user }) => status::show_status(&session, user),
        Some(Commands::Panel) => status::show_panel(),
        Some(Commands::Ping) => println!("Pong"),
    }
}

/// Reports an error the way the user needs to see it and exits.
pub fn fail(err: &HuntError) -> ! {
    if !err.is_recoverable() {
        error!("{err}");
    }
    match err {
        HuntError::Format(e) => eprintln!("Invalid format: {}", e),
        HuntError::QuotaExceeded { max, .. } => {
            eprintln!("You have reached the maximum of {} submissions for this week.", max)
        }
        HuntError::NoTarget => eprintln!("The weekly target is not set yet."),
        HuntError::Storage(e) => eprintln!("Storage unavailable: {}", e),
    }
    std::process::exit(1);
}
