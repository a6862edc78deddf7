pub mod bio;
pub mod cli;
pub mod core;
pub mod report;

pub use crate::bio::taxonomy::{ClassificationEntry, Rank, RankLadder};
pub use crate::bio::trees::{TreeDataset, TreeRecord};
pub use crate::core::classification::{
    ClassificationBuild, ClassificationIssue, ClassificationTable, ClassificationTableBuilder,
    GapPolicy, TableCell,
};
pub use crate::core::higher_taxa::HigherTaxaCache;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EggcycError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Species {species} has no {rank} entry in its classification")]
    RankGap { species: String, rank: Rank },

    #[error("Taxon name {name} appears at both {existing} and {conflicting} (species {species})")]
    NameCollision {
        species: String,
        name: String,
        existing: Rank,
        conflicting: Rank,
    },

    #[error("Taxon {name} is placed under both {existing} and {conflicting} (species {species})")]
    ParentConflict {
        species: String,
        name: String,
        existing: String,
        conflicting: String,
    },

    #[error("Missing common name for {0}")]
    MissingCommonName(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for EggcycError {
    fn from(err: serde_json::Error) -> Self {
        EggcycError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for EggcycError {
    fn from(err: reqwest::Error) -> Self {
        EggcycError::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EggcycError>;
