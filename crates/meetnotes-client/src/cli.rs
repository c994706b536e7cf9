//! Command-line interface definition.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

/// meetnotes - notes for your calendar meetings
#[derive(Debug, Parser)]
#[command(name = "meetnotes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "MEETNOTES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    pub json: bool,

    /// Server URL (overrides the config file)
    #[arg(long, env = "MEETNOTES_SERVER_URL")]
    pub server_url: Option<String>,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the Google sign-in URL
    Login,

    /// Forget the stored session token
    Logout,

    /// Session token commands
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show the signed-in user as the server sees it
    Whoami,

    /// Your notes
    Notes {
        #[command(subcommand)]
        action: NotesAction,
    },

    /// Administrative commands (ADMIN or OWNER)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },

    /// Calendar commands
    Calendar {
        #[command(subcommand)]
        action: CalendarAction,
    },

    /// Check that the server is up
    Health,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Token actions.
#[derive(Debug, Subcommand)]
pub enum TokenAction {
    /// Store the token from the sign-in redirect
    Set {
        /// The `token` value of the redirect URL
        token: String,
    },

    /// Show what the stored token says, without contacting the server
    Show,
}

/// Note actions.
#[derive(Debug, Subcommand)]
pub enum NotesAction {
    /// List your notes, most recently updated first
    List,

    /// Show one note
    Show {
        /// Calendar event ID
        event_id: String,
    },

    /// Show the edit history of a note
    History {
        /// Calendar event ID
        event_id: String,
    },

    /// Create or update a note
    Put {
        /// Calendar event ID
        event_id: String,

        /// Note content; `-` reads standard input
        content: String,
    },
}

/// Admin actions.
#[derive(Debug, Subcommand)]
pub enum AdminAction {
    /// List every note
    Notes,

    /// Overwrite any note, keeping its history
    Edit {
        /// Note ID (the calendar event ID)
        note_id: String,

        /// New content; `-` reads standard input
        content: String,
    },

    /// List users and their roles
    Users,

    /// Change a user's role (OWNER only)
    SetRole {
        /// User email
        email: String,

        /// REGULAR, ADMIN or OWNER
        role: String,
    },
}

/// Calendar actions.
#[derive(Debug, Subcommand)]
pub enum CalendarAction {
    /// List upcoming events (next 24 hours by default)
    Upcoming {
        /// Start of the window (RFC 3339)
        #[arg(long)]
        from: Option<DateTime<Utc>>,

        /// End of the window (RFC 3339)
        #[arg(long)]
        to: Option<DateTime<Utc>>,
    },

    /// Show one event
    Event {
        /// Calendar event ID
        event_id: String,
    },

    /// Register for calendar change notifications
    Watch,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
