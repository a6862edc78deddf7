use clap::Parser;
use colored::*;
use eggcyc::cli::{Cli, Commands};
use eggcyc::EggcycError;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // EGGCYC_LOG wins over -v/-q
    let filter = EnvFilter::try_from_env("EGGCYC_LOG")
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<EggcycError>() {
            Some(EggcycError::Config(_)) => 2,
            Some(EggcycError::Io(_)) => 3,
            Some(EggcycError::Serialization(_)) => 4,
            Some(EggcycError::RankGap { .. })
            | Some(EggcycError::NameCollision { .. })
            | Some(EggcycError::ParentConflict { .. })
            | Some(EggcycError::MissingCommonName(_)) => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.load_config()?;
    let quiet = cli.quiet;

    match cli.command {
        Commands::ClassTable(mut args) => {
            args.quiet = quiet;
            eggcyc::cli::commands::class_table::run(args, &config)
        }
        Commands::HigherTaxa(mut args) => {
            args.quiet = quiet;
            eggcyc::cli::commands::higher_taxa::run(args, &config)
        }
        Commands::CommonNames(mut args) => {
            args.quiet = quiet;
            eggcyc::cli::commands::common_names::run(args, &config)
        }
        Commands::Species(args) => eggcyc::cli::commands::species::run(args, &config),
    }
}
