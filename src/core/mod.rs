pub mod classification;
pub mod config;
pub mod higher_taxa;

pub use classification::{ClassificationTableBuilder, GapPolicy};
pub use config::Config;
pub use higher_taxa::HigherTaxaCache;
