//! CLI command definitions.

pub mod events;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::DEFAULT_BASE_URL;

/// CLI client for the eventdesk API.
#[derive(Debug, Parser)]
#[command(name = "eventdesk")]
#[command(about = "Browse and manage events from the terminal", long_about = None)]
pub struct Cli {
    /// Server base URL.
    #[arg(long, env = "EVENTDESK_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Output format.
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    /// Suppress non-essential output.
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Search events by term.
    Find {
        /// Search term. Matches title, description and location.
        term: String,
    },
    /// Show the most recently added events.
    Recent,
    /// Show an event.
    Show {
        /// Event ID.
        id: String,
    },
    /// Create an event.
    New(events::NewEventArgs),
    /// Edit an event. Only the given fields change.
    Edit(events::EditEventArgs),
    /// Delete an event.
    Delete {
        /// Event ID.
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
    /// List the images an event can use.
    Images,
    /// Open a route path such as /events/e1 or /events/new.
    Open {
        /// Route path.
        route: String,
    },
}
