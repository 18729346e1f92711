use std::error::Error;

use clap::{ArgAction, Parser, Subcommand};
use commands::{
    envy_free::{self, EnvyFreeArgs},
    generate::{self, GenerateArgs},
    report::{self, ReportArgs},
    solve::{self, Algorithm, SolveArgs},
    verify::{self, VerifyArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;
mod io;

#[derive(Parser, Debug)]
#[command(name = "hr-sim", about = "Stable and popular matchings for hospital/residents instances")]
struct Cli {
    /// Raise the log level (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Proposer-optimal stable matching.
    Stable(SolveArgs),
    /// Maximum-cardinality popular matching.
    Popular(SolveArgs),
    /// Maximum-cardinality matching within the upper quotas.
    MaxCard(SolveArgs),
    /// Extend a matching without creating justified envy.
    EnvyFree(EnvyFreeArgs),
    /// List the blocking pairs of a matching; fails if there is any.
    Verify(VerifyArgs),
    /// JSON statistics for the stable, popular and max-cardinality matchings.
    Report(ReportArgs),
    /// Generate a random instance from a YAML configuration.
    Generate(GenerateArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Command::Stable(args) => solve::run(Algorithm::Stable, &args),
        Command::Popular(args) => solve::run(Algorithm::Popular, &args),
        Command::MaxCard(args) => solve::run(Algorithm::MaxCardinality, &args),
        Command::EnvyFree(args) => envy_free::run(&args),
        Command::Verify(args) => verify::run(&args),
        Command::Report(args) => report::run(&args),
        Command::Generate(args) => generate::run(&args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = if verbose == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
