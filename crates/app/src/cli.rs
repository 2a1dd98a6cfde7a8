//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line client for the Garage Console API.
#[derive(Debug, Parser)]
#[command(
    name = "garage-console",
    version,
    about = "Command line client for the Garage Console API"
)]
pub struct Args {
    /// Session file. Defaults to the user config directory.
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Keep the session in memory only.
    #[arg(long, global = true, conflicts_with = "session_file")]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Operations.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session.
    Login {
        /// Account email.
        #[arg(long, env = "GARAGE_EMAIL")]
        email: String,
        /// Account password.
        #[arg(long, env = "GARAGE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Show the stored session without its tokens.
    Whoami,
    /// GET a resource and print the JSON response.
    Get {
        /// Path relative to the API base, e.g. `/vehicles`.
        path: String,
        /// Query parameters as `name=value`.
        #[arg(short, long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,
    },
    /// POST a JSON body and print the JSON response.
    Post {
        /// Path relative to the API base.
        path: String,
        /// JSON request body.
        #[arg(short, long, default_value = "{}")]
        data: String,
    },
    /// DELETE a resource.
    Delete {
        /// Path relative to the API base.
        path: String,
    },
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))
}
