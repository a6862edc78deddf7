use crate::bio::ott::OttClient;
use crate::bio::trees::TreeDataset;
use crate::bio::usda::UsdaNames;
use crate::cli::output::*;
use crate::core::config::Config;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CommonNamesArgs {
    /// Hand-maintained tree list
    #[arg(short, long, value_name = "FILE")]
    pub trees: Option<PathBuf>,

    /// Processed tree list to merge from and write to
    #[arg(short, long, value_name = "FILE")]
    pub processed: Option<PathBuf>,

    /// Gzipped USDA PLANTS export
    #[arg(long, value_name = "FILE")]
    pub usda: Option<PathBuf>,

    /// Reprocess every species instead of reusing the processed list
    #[arg(short, long)]
    pub all: bool,

    /// Also look up missing Open Tree of Life ids
    #[arg(long)]
    pub ott: bool,

    /// Hide the progress bar (passed from global)
    #[arg(skip)]
    pub quiet: bool,
}

pub fn run(args: CommonNamesArgs, config: &Config) -> anyhow::Result<()> {
    let trees_path = args.trees.unwrap_or_else(|| config.data.trees_file.clone());
    let processed_path = args
        .processed
        .unwrap_or_else(|| config.data.processed_file.clone());
    let usda_path = args.usda.unwrap_or_else(|| config.data.usda_file.clone());

    let mut trees = TreeDataset::load(&trees_path)
        .with_context(|| format!("Failed to read tree list {}", trees_path.display()))?;

    // Without --all, anything already processed is taken as is
    let processed = if args.all || !processed_path.exists() {
        None
    } else {
        let processed = TreeDataset::load(&processed_path)
            .with_context(|| format!("Failed to read {}", processed_path.display()))?;
        let merged = trees.merge_data_from(&processed);
        info(&format!(
            "Reusing {} processed species",
            format_number(merged)
        ));
        Some(processed)
    };

    let usda = UsdaNames::from_csv_gz(&usda_path)
        .with_context(|| format!("Failed to read USDA database {}", usda_path.display()))?;
    let added = trees.apply_common_names(&usda);

    section_header("Common names");
    tree_block(&[
        ("Species", format_number(trees.len())),
        ("USDA names", format_number(usda.len())),
        ("Added", format_number(added)),
    ]);

    if args.ott {
        let client = OttClient::new(&config.ott.base_url, config.ott.timeout())
            .context("Failed to create Open Tree client")?;
        let pb = lookup_progress(args.quiet);
        let found = trees.lookup_ott_ids(&client, |i, total, name| {
            pb.set_length(total as u64);
            pb.set_position(i as u64);
            pb.set_message(name.to_string());
        });
        pb.finish_and_clear();
        info(&format!("Found {} new OTT ids", format_number(found)));
    }

    if processed.as_ref() == Some(&trees) {
        empty("No new data");
        return Ok(());
    }

    trees
        .save(&processed_path)
        .with_context(|| format!("Failed to write {}", processed_path.display()))?;
    success(&format!("Wrote {}", processed_path.display()));
    Ok(())
}
