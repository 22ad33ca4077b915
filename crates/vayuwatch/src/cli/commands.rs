//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Classify command arguments.
#[derive(Debug, Args)]
pub struct ClassifyCommand {
    /// AQI value to classify
    #[arg(allow_negative_numbers = true)]
    pub aqi: f64,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Arguments shared by commands that only choose an output format.
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Cities command arguments.
#[derive(Debug, Args)]
pub struct CitiesCommand {
    /// Only the N most polluted cities
    #[arg(short, long, value_name = "N")]
    pub top: Option<usize>,

    /// Only cities in this state (state id, e.g. "delhi")
    #[arg(short, long, value_name = "STATE_ID")]
    pub state: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Arguments for commands that look up one entity by id.
#[derive(Debug, Args)]
pub struct LookupCommand {
    /// Entity id (e.g. "new-delhi")
    pub id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Trend command arguments.
#[derive(Debug, Args)]
pub struct TrendCommand {
    /// City id; unknown ids fall back to a generic baseline
    pub city: String,

    /// Seven daily points instead of 24 hourly points
    #[arg(short, long)]
    pub weekly: bool,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// GRAP command arguments.
#[derive(Debug, Args)]
pub struct GrapCommand {
    /// Mark the stages in force at this AQI
    #[arg(short, long)]
    pub aqi: Option<f64>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Account commands.
///
/// One-time codes are held in memory, so a code from `otp-send` does not
/// survive into a later invocation. In demo mode `otp-login` accepts the
/// demo code regardless.
#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Register a phone number and sign in
    Signup {
        /// Phone number
        phone: String,

        /// Password for the new account
        #[arg(short, long)]
        password: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Sign in with a password
    Login {
        /// Phone number
        phone: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// Request a one-time code
    OtpSend {
        /// Phone number
        phone: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Sign in with a one-time code, registering the phone on first use
    OtpLogin {
        /// Phone number
        phone: String,

        /// The code; when omitted a code is requested and used directly
        #[arg(long)]
        code: Option<String>,
    },

    /// Replace the password of a registered phone
    ResetPassword {
        /// Phone number
        phone: String,

        /// The new password
        #[arg(short, long)]
        password: String,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
