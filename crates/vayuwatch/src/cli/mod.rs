//! Command-line interface for vayuwatch.
//!
//! This module provides the CLI structure and the text renderers used by the
//! `vayuwatch` binary.

mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AuthCommand, CitiesCommand, ClassifyCommand, ConfigCommand, GrapCommand, LookupCommand,
    OutputArgs, TrendCommand,
};

use crate::logging::Verbosity;

/// vayuwatch - Air quality for Indian cities
///
/// Classifies AQI readings, browses the reference dataset of states, cities
/// and wards, and drives the demo phone-number account store.
#[derive(Debug, Parser)]
#[command(name = "vayuwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify an AQI value
    Classify(ClassifyCommand),

    /// National summary over all cities
    Stats(OutputArgs),

    /// List cities
    Cities(CitiesCommand),

    /// Show one city with its wards
    City(LookupCommand),

    /// Show one state with its cities
    State(LookupCommand),

    /// Show one ward
    Ward(LookupCommand),

    /// Cities at poor air quality or worse
    Alerts(OutputArgs),

    /// Simulated AQI trend for a city
    Trend(TrendCommand),

    /// Graded Response Action Plan stages
    Grap(GrapCommand),

    /// Pollution source shares
    Sources(OutputArgs),

    /// Demo accounts
    #[command(subcommand)]
    Auth(AuthCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
