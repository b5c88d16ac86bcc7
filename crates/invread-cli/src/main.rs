//! `invread` submits an invoice file to the upload relay, which forwards it
//! to Vision Parser, and prints the extracted merchant, location and amount
//! fields with their confidence range.

mod client;
mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, parse};

/// Read invoices through the Vision Parser upload relay
#[derive(Parser)]
#[command(name = "invread")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file with the relay URL and upload limit
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one PDF, JPG or PNG to the relay and show what was extracted
    Parse(parse::ParseArgs),

    /// Inspect or edit the config file
    Config(config::ConfigArgs),
}

/// Logs go to stderr so stdout carries only the rendered result.
fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Parse(args) => parse::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
