//! quakemap - interactive map of recent earthquakes.
//!
//! Fetches near-real-time USGS earthquake feeds and serves a browser-based
//! dashboard rendering them as color-coded markers, with a one-shot
//! terminal listing as an alternative.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

mod cli;
mod client;
mod encoder;
mod errors;
mod map;
mod models;
mod output;
mod server;
mod state;
mod timeframe;

use cli::{Cli, Command};
use client::FeedClient;
use state::Store;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Serve(args) => cmd_serve(&args),
        Command::Tail(args) => cmd_tail(&args),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the `serve` command - run the dashboard web server.
fn cmd_serve(args: &cli::ServeArgs) -> Result<()> {
    let config = server::ServerConfig {
        port: args.port,
        host: args.host.clone(),
        timeframe: args.timeframe,
    };

    let client = FeedClient::new().context("failed to create feed client")?;
    let store = Store::new(client);

    let url = format!("http://{}:{}", args.host, args.port);
    println!("\x1b[1m🌍 Earthquake Visualizer\x1b[0m");
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("  Local:      \x1b[96m{url}\x1b[0m");
    println!("  Timeframe:  {}", args.timeframe.label());
    println!("\x1b[2m───────────────────────────────────────\x1b[0m");
    println!("\x1b[2mPress Ctrl+C to stop\x1b[0m\n");

    // Open browser if requested (using xdg-open/open command)
    if args.open {
        #[cfg(target_os = "linux")]
        let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
        #[cfg(target_os = "macos")]
        let _ = std::process::Command::new("open").arg(&url).spawn();
        #[cfg(target_os = "windows")]
        let _ = std::process::Command::new("cmd").args(["/c", "start", &url]).spawn();
    }

    // Run the async server on tokio runtime
    tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")?
        .block_on(server::run_server(config, store))
}

/// Execute the `tail` command - one-shot fetch printed to the terminal.
fn cmd_tail(args: &cli::TailArgs) -> Result<()> {
    let client = FeedClient::new().context("failed to create feed client")?;

    let mut feed = tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")?
        .block_on(client.fetch(args.timeframe))
        .context("failed to fetch earthquake feed")?;

    // Most recent first
    feed.features
        .sort_by(|a, b| b.properties.time.cmp(&a.properties.time));

    let mut markers = map::project(&feed);
    markers.truncate(args.limit);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_markers(&mut handle, &markers, args.format)?;
    handle.flush()?;

    Ok(())
}
