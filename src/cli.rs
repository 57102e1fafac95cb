//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use clap::{Parser, Subcommand};

use crate::output::Format;
use crate::timeframe::Timeframe;

/// Interactive map of recent earthquakes from USGS feeds.
#[derive(Parser, Debug)]
#[command(name = "quakemap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the map dashboard
    Serve(ServeArgs),

    /// Show recent earthquakes in the terminal (one-shot fetch and exit)
    Tail(TailArgs),
}

/// Arguments for the `serve` command.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, short = 'p', default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Timeframe loaded on startup
    #[arg(long, default_value = "day", value_parser = parse_timeframe)]
    pub timeframe: Timeframe,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

/// Arguments for the `tail` command.
#[derive(Parser, Debug)]
pub struct TailArgs {
    /// Timeframe to fetch
    #[arg(long, default_value = "day", value_parser = parse_timeframe)]
    pub timeframe: Timeframe,

    /// Maximum number of events to show
    #[arg(long, short = 'n', default_value = "50")]
    pub limit: usize,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Parse a timeframe from string.
fn parse_timeframe(s: &str) -> Result<Timeframe, String> {
    s.parse()
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}
