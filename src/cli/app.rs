//! Main CLI application structure

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{roster, rotation};
use crate::domain::RawRotationConfig;
use crate::logging;
use crate::storage::{Config, InitOptions, Project};

#[derive(Parser)]
#[command(name = "rota")]
#[command(author, version, about = "Local-first duty rotation for small teams")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Project directory (defaults to the current directory or a parent)
    #[arg(long, short = 'C', global = true, env = "ROTA_PROJECT")]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new rota project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Roster member, in rotation order (repeatable)
        #[arg(long = "member", short = 'm', required = true)]
        members: Vec<String>,

        /// Rotation frequency: daily, weekly, biweekly, monthly or custom
        #[arg(long, default_value = "weekly")]
        frequency: String,

        /// First day of the week, 0 = Sunday .. 6 = Saturday
        #[arg(long)]
        week_start_day: Option<i64>,

        /// Days per period for the custom frequency
        #[arg(long)]
        interval: Option<i64>,

        /// Handover day for the monthly frequency
        #[arg(long)]
        month_day: Option<i64>,

        /// Local calendar offset from UTC, in minutes
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        utc_offset_minutes: i32,

        /// Rotation start (RFC 3339 or YYYY-MM-DD, defaults to now)
        #[arg(long)]
        start: Option<String>,
    },

    /// Show who is on duty, rotating first if a new period began
    Current {
        /// Never rotate, just report the pointer
        #[arg(long)]
        read_only: bool,
    },

    /// Hand over to the next member now
    Skip,

    /// Put a specific member on duty
    Set {
        /// Member identity
        identity: String,
    },

    /// Preview upcoming periods and their owners
    Schedule {
        /// Number of periods to show (defaults to config schedule_periods)
        #[arg(long, short = 'n')]
        periods: Option<u32>,
    },

    /// Show who owns the period containing a date
    On {
        /// Date (RFC 3339 or YYYY-MM-DD)
        date: String,
    },

    /// Show the period containing a date
    Period {
        /// Date (RFC 3339 or YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// Emit the current owner and period for a notifier
    Notify,

    /// Check the rotation state for consistency
    Validate,

    /// Manage the roster
    #[command(subcommand)]
    Roster(roster::RosterCommands),
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format,
    };
    let output = Output::new(format);

    tracing::debug!("rota starting");

    match cli.command {
        Commands::Init {
            path,
            members,
            frequency,
            week_start_day,
            interval,
            month_day,
            utc_offset_minutes,
            start,
        } => {
            let start = start
                .as_deref()
                .map(rotation::parse_date)
                .transpose()?;
            let options = InitOptions {
                members,
                rotation: RawRotationConfig {
                    frequency,
                    interval,
                    week_start_day,
                    month_day,
                },
                utc_offset_minutes,
                start,
            };
            let project = Project::init(&path, options)?;
            output.success(&format!(
                "Initialized rota project at {}",
                project.root().display()
            ));
        }

        Commands::Current { read_only } => {
            rotation::current(&open_project(cli.project)?, &output, read_only)?
        }
        Commands::Skip => rotation::skip(&open_project(cli.project)?, &output)?,
        Commands::Set { identity } => {
            rotation::set(&open_project(cli.project)?, &output, &identity)?
        }
        Commands::Schedule { periods } => {
            rotation::schedule(&open_project(cli.project)?, &output, periods)?
        }
        Commands::On { date } => rotation::owner_on(&open_project(cli.project)?, &output, &date)?,
        Commands::Period { date } => {
            rotation::period(&open_project(cli.project)?, &output, date.as_deref())?
        }
        Commands::Notify => rotation::notify(&open_project(cli.project)?, &output)?,
        Commands::Validate => rotation::validate(&open_project(cli.project)?, &output)?,
        Commands::Roster(cmd) => roster::run(cmd, &open_project(cli.project)?, &output)?,
    }

    Ok(())
}

fn open_project(path: Option<PathBuf>) -> Result<Project> {
    let project = match path {
        Some(path) => Project::discover(&path)
            .with_context(|| format!("No rota project at {}", path.display())),
        None => Project::open_current(),
    }?;
    tracing::debug!(root = %project.root().display(), "opened project");
    Ok(project)
}
