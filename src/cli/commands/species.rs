use crate::bio::trees::TreeDataset;
use crate::cli::output::*;
use crate::core::config::Config;
use anyhow::Context;
use clap::Args;
use colored::*;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SpeciesArgs {
    /// Processed tree list
    #[arg(short, long, value_name = "FILE")]
    pub trees: Option<PathBuf>,

    /// Only print the Open Tree of Life ids, one per line
    #[arg(long)]
    pub ott_ids: bool,
}

pub fn run(args: SpeciesArgs, config: &Config) -> anyhow::Result<()> {
    let trees_path = args.trees.unwrap_or_else(|| config.data.processed_file.clone());
    let trees = TreeDataset::load(&trees_path)
        .with_context(|| format!("Failed to read tree list {}", trees_path.display()))?;

    if args.ott_ids {
        for id in trees.ott_ids() {
            println!("{}", id);
        }
        return Ok(());
    }

    section_header(&format!("{} species", format_number(trees.len())));
    let mut missing = 0;
    for (species, record) in trees.iter() {
        if record.is_skipped() {
            println!("{} {}", species.italic(), "(skipped)".dimmed());
            continue;
        }
        match (trees.species_page(species), trees.egg_photo_base(species)) {
            (Ok(page), Ok(photos)) => {
                println!("{}", species.italic());
                tree_item(false, "Page", Some(&page));
                tree_item(true, "Egg photos", Some(&photos));
            }
            (Err(e), _) | (_, Err(e)) => {
                warning(&e.to_string());
                missing += 1;
            }
        }
    }

    if missing > 0 {
        warning(&format!(
            "{} species have no common name; run `eggcyc common-names` first",
            missing
        ));
    }
    Ok(())
}
