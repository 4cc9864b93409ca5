//! CLI command definitions

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Terminal client for the notes API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Log HTTP and session activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the issued tokens
    Login {
        username: String,

        /// Password (read from stdin if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create an account
    Signup {
        username: String,

        /// Email address
        #[arg(default_value = "")]
        email: String,

        /// Password (read from stdin if omitted)
        #[arg(short, long)]
        password: Option<String>,

        /// Password confirmation (defaults to the password)
        #[arg(long = "confirm")]
        password2: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show whether a session is held
    Status,

    /// Exchange the refresh token for a new access token
    Refresh,

    /// List notes, pinned first
    List,

    /// Print a note
    Show { id: i64 },

    /// Create a note
    New {
        #[arg(short, long, default_value = crate::domain::note::DEFAULT_TITLE)]
        title: String,

        #[arg(short, long, default_value = crate::domain::note::DEFAULT_MARKDOWN)]
        markdown: String,

        #[arg(long)]
        pinned: bool,
    },

    /// Edit a note, in $EDITOR unless fields are given
    Edit {
        id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        markdown: Option<String>,
    },

    /// Append stdin lines to a note, autosaving as you type
    Write { id: i64 },

    /// Pin a note to the top of the list
    Pin { id: i64 },

    /// Unpin a note
    Unpin { id: i64 },

    /// Delete a note
    Rm { id: i64 },

    /// View or modify configuration
    Config {
        /// Config key to get or set
        key: Option<String>,

        /// Value to set (if provided, sets the key)
        value: Option<String>,

        /// List all configuration
        #[arg(short, long)]
        list: bool,
    },
}
