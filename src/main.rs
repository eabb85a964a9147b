use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use git_testament::{git_testament, render_testament};

mod commands;

git_testament!(TESTAMENT);

/// Derives quality metrics for targeted PCR (amplicon) sequencing experiments.
#[derive(Parser)]
#[command(name = "pcrqc", propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    subcommand: Subcommands,

    /// Only errors are printed to the stderr stream.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// All available information, including debug information, is printed to
    /// stderr.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
}

#[derive(Subcommand)]
enum Subcommands {
    /// Derives the targeted PCR metrics for every accumulation level in a file.
    Derive(commands::derive::DeriveArgs),

    /// Checks the raw inputs in a file without deriving any metrics.
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let version = render_testament!(TESTAMENT);
    let matches = Cli::command().version(version).get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let mut level = tracing::Level::INFO;
    if cli.quiet {
        level = tracing::Level::ERROR;
    } else if cli.verbose {
        level = tracing::Level::DEBUG;
    }

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    match cli.subcommand {
        Subcommands::Derive(args) => commands::derive::derive(args),
        Subcommands::Validate(args) => commands::validate::validate(args),
    }
}
