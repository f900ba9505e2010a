//! CLI argument parsing via clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Google sign-in and AI-assisted email drafting from the terminal.
#[derive(Debug, Parser)]
#[command(name = "alchemailyst", version)]
pub struct Args {
    /// Path to config file (default: ./alchemailyst.toml or
    /// ~/.config/alchemailyst/alchemailyst.toml).
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Disable color output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the Google consent URL and open it in a browser.
    Login {
        /// Print the URL without launching a browser.
        #[arg(long = "no-browser")]
        no_browser: bool,
    },
    /// Finish login with the authorization code or the full redirect URL.
    Callback {
        /// Bare code, `code=...` query, or the redirected URL.
        input: String,
    },
    /// Show the stored session and AI provider readiness.
    Status,
    /// Refresh the stored access token now.
    Refresh,
    /// Forget stored tokens.
    Logout,
    /// Send a prompt through the completion gateway.
    Generate {
        prompt: String,
        /// Extra context given to the model ahead of the prompt.
        #[arg(long)]
        context: Option<String>,
    },
    /// Summarize one email in a sentence.
    Summarize {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        content: String,
    },
    /// Draft an email in a given tone.
    Compose {
        #[arg(long)]
        recipient: String,
        #[arg(long)]
        subject: String,
        /// What the email should say.
        #[arg(long)]
        brief: String,
        #[arg(long)]
        persona: Option<String>,
    },
    /// Check configuration and provider connectivity.
    Doctor,
    /// Manage documents in the primary provider's context store.
    #[command(subcommand)]
    Context(ContextCommand),
}

#[derive(Debug, Subcommand)]
pub enum ContextCommand {
    /// Add a JSON payload as-is.
    Add { json: String },
    Search {
        query: String,
        #[arg(long)]
        threshold: Option<f32>,
    },
    /// Delete every document added under a source.
    Delete { source: String },
}
