//! CLI module - Command-line interface for Insight
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{ArgAction, Parser, Subcommand};

/// Insight - document QA portal
/// Serves the web API and offers offline account maintenance
#[derive(Parser)]
#[command(name = "insight")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    Init,

    /// Manage user accounts without the web UI
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List all accounts with role and status
    #[command(alias = "ls")]
    List,

    /// Activate or deactivate an account
    SetActive {
        /// Account name
        username: String,
        /// `true` to activate, `false` to deactivate
        #[arg(action = ArgAction::Set)]
        active: bool,
    },

    /// Delete an account
    #[command(alias = "rm")]
    Delete {
        /// Account name
        username: String,
    },
}

pub use commands::*;
