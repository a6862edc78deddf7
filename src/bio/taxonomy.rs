/// Taxonomic ranks and the classification entries attached to tree species
use crate::{EggcycError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ranks of the classification table, from kingdom down to species
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rank {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

impl Rank {
    pub const ALL: [Rank; 7] = [
        Rank::Kingdom,
        Rank::Phylum,
        Rank::Class,
        Rank::Order,
        Rank::Family,
        Rank::Genus,
        Rank::Species,
    ];

    /// Parse a rank as GBIF writes it ("KINGDOM", "family", ...)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "kingdom" => Some(Self::Kingdom),
            "phylum" => Some(Self::Phylum),
            "class" => Some(Self::Class),
            "order" => Some(Self::Order),
            "family" => Some(Self::Family),
            "genus" => Some(Self::Genus),
            "species" => Some(Self::Species),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kingdom => "KINGDOM",
            Self::Phylum => "PHYLUM",
            Self::Class => "CLASS",
            Self::Order => "ORDER",
            Self::Family => "FAMILY",
            Self::Genus => "GENUS",
            Self::Species => "SPECIES",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Rank::parse(s).ok_or_else(|| format!("Unknown rank: {}", s))
    }
}

/// One (rank, name) step of a species' lineage as stored in the tree dataset.
///
/// The rank is kept as the raw string so that entries with ranks outside the
/// table (e.g. "SUBSPECIES") survive a load/save round trip untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationEntry {
    pub rank: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<u64>,
}

impl ClassificationEntry {
    pub fn new(rank: Rank, name: impl Into<String>) -> Self {
        Self {
            rank: rank.as_str().to_string(),
            name: name.into(),
            key: None,
        }
    }

    pub fn with_key(mut self, key: u64) -> Self {
        self.key = Some(key);
        self
    }

    pub fn parsed_rank(&self) -> Option<Rank> {
        Rank::parse(&self.rank)
    }
}

/// Ordered root-to-leaf list of ranks shown in the classification table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankLadder {
    ranks: Vec<Rank>,
}

impl RankLadder {
    /// Build a ladder; ranks must be non-empty, unique and ordered root to leaf
    pub fn new(ranks: Vec<Rank>) -> Result<Self> {
        if ranks.is_empty() {
            return Err(EggcycError::Config("rank ladder is empty".to_string()));
        }
        for pair in ranks.windows(2) {
            if pair[0] >= pair[1] {
                return Err(EggcycError::Config(format!(
                    "rank ladder must run from kingdom towards species, found {} before {}",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(Self { ranks })
    }

    pub fn ranks(&self) -> &[Rank] {
        &self.ranks
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn position(&self, rank: Rank) -> Option<usize> {
        self.ranks.iter().position(|r| *r == rank)
    }

    pub fn contains(&self, rank: Rank) -> bool {
        self.position(rank).is_some()
    }

    /// Rank immediately below `rank`, None for the leaf
    pub fn child(&self, rank: Rank) -> Option<Rank> {
        self.position(rank).and_then(|i| self.ranks.get(i + 1).copied())
    }

    /// Rank immediately above `rank`, None for the root
    pub fn parent(&self, rank: Rank) -> Option<Rank> {
        match self.position(rank) {
            Some(0) | None => None,
            Some(i) => Some(self.ranks[i - 1]),
        }
    }
}

impl Default for RankLadder {
    fn default() -> Self {
        Self {
            ranks: Rank::ALL.to_vec(),
        }
    }
}
