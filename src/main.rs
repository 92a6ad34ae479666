use anyhow::{Context, Result};
use appcleanup::{CleanupContext, CleanupPlan, ConsoleSink, LocalFs};
use chrono::Local;
use clap::Parser;
use colored::*;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "appcleanup-rust")]
#[command(about = "🧹 App Cleanup Tool (Rust Edition)", long_about = None)]
struct Cli {
    /// Cleanup plan to use instead of the built-in one (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Exit right away instead of waiting for Enter
    #[arg(long, default_value_t = false)]
    no_wait: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn wait_for_enter() -> Result<()> {
    print!("\n{} ", "Press Enter to exit.".yellow());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let home = appcleanup::config::home_dir()?;
    let plan = match &cli.config {
        Some(path) => CleanupPlan::from_file(path, &home)
            .with_context(|| format!("Failed to load cleanup plan from {}", path.display()))?,
        None => CleanupPlan::embedded(&home).context("Built-in cleanup plan is invalid")?,
    };
    tracing::debug!(
        versioned = plan.versioned.len(),
        remove = plan.remove.len(),
        "Loaded cleanup plan"
    );

    let sink = ConsoleSink::new(cli.verbose);
    sink.print_banner(&Local::now().format("%Y-%m-%d %H:%M:%S").to_string());

    let mut ctx = CleanupContext::new(LocalFs, sink);
    let stats = ctx.run(&plan);

    ctx.into_sink()
        .print_summary(&stats, &Local::now().format("%Y-%m-%d %H:%M:%S").to_string());

    if !cli.no_wait {
        wait_for_enter()?;
    }

    Ok(())
}
