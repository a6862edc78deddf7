use crate::bio::trees::TreeDataset;
use crate::cli::commands::higher_taxa::{print_summary, refresh_from_gbif};
use crate::cli::output::*;
use crate::core::classification::{ClassificationTableBuilder, GapPolicy};
use crate::core::config::Config;
use crate::core::higher_taxa::HigherTaxaCache;
use crate::report::class_table::{write_class_table, ClassTableOptions, CommonNameLabeler};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ClassTableArgs {
    /// Processed tree list with classifications
    #[arg(short, long, value_name = "FILE")]
    pub trees: Option<PathBuf>,

    /// Higher taxa cache used for common names
    #[arg(long, value_name = "FILE")]
    pub higher_taxa: Option<PathBuf>,

    /// Output HTML file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Fail on the first rank gap or name collision instead of skipping the species
    #[arg(long)]
    pub strict: bool,

    /// Look up missing higher taxa names on GBIF before rendering
    #[arg(long)]
    pub lookup: bool,

    /// Hide the progress bar (passed from global)
    #[arg(skip)]
    pub quiet: bool,
}

pub fn run(args: ClassTableArgs, config: &Config) -> anyhow::Result<()> {
    let trees_path = args.trees.unwrap_or_else(|| config.data.processed_file.clone());
    let cache_path = args
        .higher_taxa
        .unwrap_or_else(|| config.data.higher_taxa_file.clone());
    let output_path = args.output.unwrap_or_else(|| config.table.output.clone());
    let policy = if args.strict {
        GapPolicy::Fail
    } else {
        config.table.gap_policy
    };

    let trees = TreeDataset::load(&trees_path)
        .with_context(|| format!("Failed to read tree list {}", trees_path.display()))?;
    let mut higher_taxa = HigherTaxaCache::load(&cache_path)
        .with_context(|| format!("Failed to read higher taxa {}", cache_path.display()))?;

    if args.lookup {
        let summary = refresh_from_gbif(&mut higher_taxa, &trees, config, None, args.quiet)?;
        print_summary(&summary);
        if higher_taxa.is_dirty() {
            higher_taxa
                .save(&cache_path)
                .with_context(|| format!("Failed to write {}", cache_path.display()))?;
        }
    }

    let build = ClassificationTableBuilder::new(config.table.ladder()?)
        .with_policy(policy)
        .build(&trees)?;

    let labeler = CommonNameLabeler::new(&higher_taxa).with_trees(&trees);
    let options = ClassTableOptions {
        rotated_ranks: config.table.rotated_ranks.clone(),
    };
    write_class_table(&output_path, &build.table, &labeler, &options)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    success(&format!(
        "Wrote {} rows to {}",
        format_number(build.table.row_count()),
        output_path.display()
    ));

    if build.has_issues() {
        section_header(&format!(
            "Skipped {} species with classification problems",
            build.issues.len()
        ));
        for (i, issue) in build.issues.iter().enumerate() {
            tree_item(i + 1 == build.issues.len(), &issue.to_string(), None);
        }
    }
    Ok(())
}
