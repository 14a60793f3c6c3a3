use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "habitscale-cli", version, about = "Habitscale CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the tilt angle for a pair of totals
    Angle(commands::balance::AngleArgs),
    /// Check the success condition for a step and short-term total
    Check(commands::balance::CheckArgs),
    /// Run an interactive session reading commands from stdin
    Session(commands::session::SessionArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env("HABITSCALE_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries JSON output; logs go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(env_filter)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Angle(args) => commands::balance::run_angle(args),
        Commands::Check(args) => commands::balance::run_check(args),
        Commands::Session(args) => commands::session::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
