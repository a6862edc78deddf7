pub mod commands;
pub mod output;

use crate::core::config::{default_config, load_config, Config};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "eggcyc",
    version,
    about = "Build the eggcyclopedia tree data and classification table",
    long_about = "eggcyc maintains the eggcyclopedia tree list: it fills in common names from \
                  the USDA PLANTS database and GBIF, and renders the rank-aligned \
                  classification table included by the website."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE", env = "EGGCYC_CONFIG", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the classification table
    ClassTable(commands::class_table::ClassTableArgs),

    /// Look up common names for higher taxa on GBIF
    HigherTaxa(commands::higher_taxa::HigherTaxaArgs),

    /// Fill in species common names from the USDA PLANTS database
    CommonNames(commands::common_names::CommonNamesArgs),

    /// List species with their page and egg photo paths
    Species(commands::species::SpeciesArgs),
}

impl Cli {
    /// Log filter used when `EGGCYC_LOG` is not set
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// The `--config` file, or the built-in defaults
    pub fn load_config(&self) -> crate::Result<Config> {
        match &self.config {
            Some(path) => load_config(path),
            None => Ok(default_config()),
        }
    }
}
