//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// SemPlan - academic plan state and validation engine
#[derive(Parser)]
#[command(
    name = "sp",
    about = "Semester planner: validate, arrange, and persist a multi-year course plan",
    version,
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Data directory overriding the configured one
    #[arg(short, long, global = true, help = "Data directory for the plan and pending-change store")]
    pub data_dir: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a fresh default plan (overwrites any existing plan)
    Init {
        /// Admission year the plan starts from
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Show the plan, credit totals, and GPA
    Status {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Check a placement without applying it
    Validate {
        /// Course id or code
        course: String,

        /// Target semester id (e.g. fall-2025)
        semester: String,
    },

    /// Move a course between semesters
    Move {
        /// Course id or code
        course: String,

        /// Source semester id
        from: String,

        /// Target semester id
        to: String,

        /// Apply even when warnings are reported
        #[arg(long)]
        force: bool,
    },

    /// Add a catalog course to a semester
    Add {
        /// Course id or code
        course: String,

        /// Target semester id
        semester: String,
    },

    /// Remove a course from a semester
    Remove {
        /// Course id or code
        course: String,

        /// Semester id holding the course
        semester: String,
    },

    /// Record a final grade for a course
    Complete {
        /// Course id or code
        course: String,

        /// Letter grade (A, A-, B+, ...)
        grade: String,
    },

    /// Revert the most recent change made in this invocation
    ///
    /// Undo history is in-memory only; each run of the binary starts with an
    /// empty log, so only changes made earlier in the same process can be
    /// reverted.
    Undo,

    /// Export the plan as an iCalendar file
    Export {
        /// Output path
        #[arg(short, long, default_value = "my-academic-plan.ics")]
        output: PathBuf,

        /// Restrict the export to these course ids
        #[arg(long, value_delimiter = ',')]
        courses: Vec<String>,
    },

    /// List the course catalog
    Catalog {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Output format for status/catalog commands
#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
