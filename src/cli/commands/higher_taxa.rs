use crate::bio::gbif::GbifClient;
use crate::bio::trees::TreeDataset;
use crate::cli::output::*;
use crate::core::config::Config;
use crate::core::higher_taxa::{HigherTaxaCache, RefreshSummary};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct HigherTaxaArgs {
    /// Processed tree list whose classifications are looked up
    #[arg(short, long, value_name = "FILE")]
    pub trees: Option<PathBuf>,

    /// Higher taxa cache to update
    #[arg(long, value_name = "FILE")]
    pub higher_taxa: Option<PathBuf>,

    /// GBIF API base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Hide the progress bar (passed from global)
    #[arg(skip)]
    pub quiet: bool,
}

pub fn run(args: HigherTaxaArgs, config: &Config) -> anyhow::Result<()> {
    let trees_path = args.trees.unwrap_or_else(|| config.data.processed_file.clone());
    let cache_path = args
        .higher_taxa
        .unwrap_or_else(|| config.data.higher_taxa_file.clone());

    let trees = TreeDataset::load(&trees_path)
        .with_context(|| format!("Failed to read tree list {}", trees_path.display()))?;
    let mut cache = HigherTaxaCache::load(&cache_path)
        .with_context(|| format!("Failed to read higher taxa {}", cache_path.display()))?;

    let summary = refresh_from_gbif(&mut cache, &trees, config, args.base_url.as_deref(), args.quiet)?;
    print_summary(&summary);

    if cache.is_dirty() {
        cache
            .save(&cache_path)
            .with_context(|| format!("Failed to write {}", cache_path.display()))?;
        success(&format!("Updated {}", cache_path.display()));
    } else {
        empty("No new higher taxa names");
    }
    Ok(())
}

/// Fill `cache` from GBIF with a progress bar. Shared with `class-table --lookup`.
pub(crate) fn refresh_from_gbif(
    cache: &mut HigherTaxaCache,
    trees: &TreeDataset,
    config: &Config,
    base_url: Option<&str>,
    quiet: bool,
) -> anyhow::Result<RefreshSummary> {
    let base_url = base_url.unwrap_or(&config.gbif.base_url);
    let client = GbifClient::new(base_url, &config.gbif.language, config.gbif.timeout())
        .context("Failed to create GBIF client")?;

    let pb = lookup_progress(quiet);
    let summary = cache.refresh_with_progress(trees, &client, |i, total, name| {
        pb.set_length(total as u64);
        pb.set_position(i as u64);
        pb.set_message(name.to_string());
    })?;
    pb.finish_and_clear();
    Ok(summary)
}

pub(crate) fn print_summary(summary: &RefreshSummary) {
    section_header("GBIF lookup");
    tree_block(&[
        ("Requested", format_number(summary.requested)),
        ("Added", format_number(summary.added)),
        ("Failed", format_number(summary.failed)),
    ]);
    if summary.interrupted {
        warning("Lookup stopped early after a network error; run again to continue");
    }
}
