//! Rank-aligned classification table.
//!
//! Turns the flat per-species classifications of the tree dataset into a table
//! with one column per rank and one row per classified species. Each taxon
//! occupies a single cell whose rowspan equals the number of species beneath
//! it, so reading a row left to right gives that species' lineage.

use crate::bio::taxonomy::{ClassificationEntry, Rank, RankLadder};
use crate::bio::trees::TreeDataset;
use crate::{EggcycError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use tracing::{debug, warn};

/// What to do with a species whose classification can't be placed in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapPolicy {
    /// Leave the species out, record the issue and keep going
    #[default]
    Skip,
    /// Abort the build with an error naming the species
    Fail,
}

impl std::str::FromStr for GapPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(GapPolicy::Skip),
            "fail" => Ok(GapPolicy::Fail),
            _ => Err(format!("Unknown gap policy: {}", s)),
        }
    }
}

/// Data problems found while building the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationIssue {
    /// The classification has no entry for one or more ranks of the ladder
    RankGap { species: String, missing: Vec<Rank> },
    /// The same name is used at two different ranks
    NameCollision {
        species: String,
        name: String,
        existing: Rank,
        conflicting: Rank,
    },
    /// The same taxon sits under two different parents
    ParentConflict {
        species: String,
        name: String,
        existing: String,
        conflicting: String,
    },
}

impl ClassificationIssue {
    pub fn species(&self) -> &str {
        match self {
            Self::RankGap { species, .. }
            | Self::NameCollision { species, .. }
            | Self::ParentConflict { species, .. } => species,
        }
    }

    fn into_error(self) -> EggcycError {
        match self {
            Self::RankGap { species, missing } => EggcycError::RankGap {
                species,
                rank: missing.first().copied().unwrap_or(Rank::Species),
            },
            Self::NameCollision {
                species,
                name,
                existing,
                conflicting,
            } => EggcycError::NameCollision {
                species,
                name,
                existing,
                conflicting,
            },
            Self::ParentConflict {
                species,
                name,
                existing,
                conflicting,
            } => EggcycError::ParentConflict {
                species,
                name,
                existing,
                conflicting,
            },
        }
    }
}

impl fmt::Display for ClassificationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RankGap { species, missing } => {
                let ranks: Vec<&str> = missing.iter().map(|r| r.as_str()).collect();
                write!(f, "Species {} is missing {} in its classification", species, ranks.join(", "))
            }
            Self::NameCollision {
                species,
                name,
                existing,
                conflicting,
            } => write!(
                f,
                "Taxon name {} appears at both {} and {} (species {})",
                name, existing, conflicting, species
            ),
            Self::ParentConflict {
                species,
                name,
                existing,
                conflicting,
            } => write!(
                f,
                "Taxon {} is placed under both {} and {} (species {})",
                name, existing, conflicting, species
            ),
        }
    }
}

/// First row of a run of rows sharing one taxon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    pub name: String,
    pub rowspan: usize,
}

/// Table slots indexed by rank then row. `None` continues the cell above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationTable {
    ladder: RankLadder,
    rows: usize,
    columns: Vec<Vec<Option<TableCell>>>,
    name_counts: BTreeMap<String, usize>,
}

impl ClassificationTable {
    pub fn ladder(&self) -> &RankLadder {
        &self.ladder
    }

    pub fn ranks(&self) -> &[Rank] {
        self.ladder.ranks()
    }

    /// Number of species rows (N)
    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// All N slots for a rank
    pub fn column(&self, rank: Rank) -> Option<&[Option<TableCell>]> {
        self.ladder
            .position(rank)
            .map(|i| self.columns[i].as_slice())
    }

    /// Non-empty cells of a rank with their starting row
    pub fn cells(&self, rank: Rank) -> impl Iterator<Item = (usize, &TableCell)> + '_ {
        self.column(rank)
            .unwrap_or(&[])
            .iter()
            .enumerate()
            .filter_map(|(row, slot)| slot.as_ref().map(|cell| (row, cell)))
    }

    /// Cells that start on a given row, in rank order
    pub fn row(&self, row: usize) -> Vec<(Rank, &TableCell)> {
        self.ranks()
            .iter()
            .zip(&self.columns)
            .filter_map(|(rank, column)| {
                column
                    .get(row)
                    .and_then(|slot| slot.as_ref())
                    .map(|cell| (*rank, cell))
            })
            .collect()
    }

    /// Number of species beneath a taxon name (0 if unknown)
    pub fn name_count(&self, name: &str) -> usize {
        self.name_counts.get(name).copied().unwrap_or(0)
    }
}

/// Result of a build: the table plus any species left out of it
#[derive(Debug, Clone)]
pub struct ClassificationBuild {
    pub table: ClassificationTable,
    pub issues: Vec<ClassificationIssue>,
}

impl ClassificationBuild {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

pub struct ClassificationTableBuilder {
    ladder: RankLadder,
    policy: GapPolicy,
}

impl ClassificationTableBuilder {
    pub fn new(ladder: RankLadder) -> Self {
        Self {
            ladder,
            policy: GapPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: GapPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(&self, dataset: &TreeDataset) -> Result<ClassificationBuild> {
        self.build_from(
            dataset
                .iter()
                .map(|(species, record)| (species, record.classification.as_deref())),
        )
    }

    /// Build from `(species, classification)` pairs; species without a
    /// classification are ignored.
    pub fn build_from<'a, I>(&self, species: I) -> Result<ClassificationBuild>
    where
        I: IntoIterator<Item = (&'a str, Option<&'a [ClassificationEntry]>)>,
    {
        let mut issues = Vec::new();
        let mut name_ranks: HashMap<String, Rank> = HashMap::new();
        let mut parents: HashMap<String, String> = HashMap::new();
        let mut lineages: Vec<Vec<String>> = Vec::new();

        for (name, classification) in species {
            let Some(classification) = classification else {
                debug!("No classification for {}, leaving it out of the table", name);
                continue;
            };

            let checked = self
                .lineage(name, classification)
                .and_then(|lineage| {
                    self.check_names(name, &lineage, &name_ranks, &parents)
                        .map(|_| lineage)
                });
            let lineage = match checked {
                Ok(lineage) => lineage,
                Err(issue) => {
                    self.report(issue, &mut issues)?;
                    continue;
                }
            };

            for (level, (rank, taxon)) in self.ladder.ranks().iter().zip(&lineage).enumerate() {
                name_ranks.entry(taxon.clone()).or_insert(*rank);
                if self.ladder.parent(*rank).is_some() {
                    parents
                        .entry(taxon.clone())
                        .or_insert_with(|| lineage[level - 1].clone());
                }
            }
            lineages.push(lineage);
        }

        let table = self.assemble(&lineages)?;
        debug!(
            "Classification table: {} rows, {} species left out",
            table.row_count(),
            issues.len()
        );
        Ok(ClassificationBuild { table, issues })
    }

    fn report(&self, issue: ClassificationIssue, issues: &mut Vec<ClassificationIssue>) -> Result<()> {
        match self.policy {
            GapPolicy::Fail => Err(issue.into_error()),
            GapPolicy::Skip => {
                warn!("{}", issue);
                issues.push(issue);
                Ok(())
            }
        }
    }

    /// One name per ladder rank; the species key always stands in for SPECIES
    fn lineage(
        &self,
        species: &str,
        classification: &[ClassificationEntry],
    ) -> std::result::Result<Vec<String>, ClassificationIssue> {
        let mut names: HashMap<Rank, &str> = HashMap::new();
        for entry in classification {
            match entry.parsed_rank() {
                Some(Rank::Species) | None => {}
                Some(rank) => {
                    names.insert(rank, entry.name.as_str());
                }
            }
        }
        if self.ladder.contains(Rank::Species) {
            names.insert(Rank::Species, species);
        }

        let missing: Vec<Rank> = self
            .ladder
            .ranks()
            .iter()
            .filter(|rank| !names.contains_key(*rank))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(ClassificationIssue::RankGap {
                species: species.to_string(),
                missing,
            });
        }

        Ok(self
            .ladder
            .ranks()
            .iter()
            .map(|rank| names[rank].to_string())
            .collect())
    }

    /// Names must keep one rank and one parent across the whole table
    fn check_names(
        &self,
        species: &str,
        lineage: &[String],
        name_ranks: &HashMap<String, Rank>,
        parents: &HashMap<String, String>,
    ) -> std::result::Result<(), ClassificationIssue> {
        let mut seen: HashMap<&str, Rank> = HashMap::new();
        for (level, (rank, name)) in self.ladder.ranks().iter().zip(lineage).enumerate() {
            let existing = name_ranks
                .get(name)
                .or_else(|| seen.get(name.as_str()))
                .copied();
            if let Some(existing) = existing.filter(|r| r != rank) {
                return Err(ClassificationIssue::NameCollision {
                    species: species.to_string(),
                    name: name.clone(),
                    existing,
                    conflicting: *rank,
                });
            }
            seen.insert(name, *rank);

            if self.ladder.parent(*rank).is_some() {
                let parent = &lineage[level - 1];
                if let Some(existing) = parents.get(name).filter(|p| *p != parent) {
                    return Err(ClassificationIssue::ParentConflict {
                        species: species.to_string(),
                        name: name.clone(),
                        existing: existing.clone(),
                        conflicting: parent.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn assemble(&self, lineages: &[Vec<String>]) -> Result<ClassificationTable> {
        let ranks = self.ladder.ranks();
        let rows = lineages.len();

        let mut roots: BTreeSet<&str> = BTreeSet::new();
        let mut name_counts: BTreeMap<String, usize> = BTreeMap::new();
        // children[rank][name] = names at the child rank beneath `name`, sorted
        let mut children: HashMap<Rank, BTreeMap<&str, BTreeSet<&str>>> = HashMap::new();

        for lineage in lineages {
            roots.insert(&lineage[0]);
            for (level, (rank, name)) in ranks.iter().zip(lineage).enumerate() {
                *name_counts.entry(name.clone()).or_insert(0) += 1;
                if self.ladder.child(*rank).is_some() {
                    children
                        .entry(*rank)
                        .or_default()
                        .entry(name)
                        .or_default()
                        .insert(&lineage[level + 1]);
                }
            }
        }

        let mut columns: Vec<Vec<Option<TableCell>>> = vec![vec![None; rows]; ranks.len()];

        // Runs of (name, first row) at the rank being filled
        let mut runs: Vec<(&str, usize)> = Vec::with_capacity(roots.len());
        let mut cursor = 0;
        for name in roots {
            runs.push((name, cursor));
            cursor += name_counts[name];
        }

        for (column, rank) in columns.iter_mut().zip(ranks) {
            let mut next_runs = Vec::new();
            for &(name, start) in &runs {
                let rowspan = name_counts[name];
                let slot = column.get_mut(start).ok_or_else(|| {
                    EggcycError::Other(format!(
                        "classification rows out of alignment at {} ({})",
                        rank, name
                    ))
                })?;
                *slot = Some(TableCell {
                    name: name.to_string(),
                    rowspan,
                });

                if let Some(kids) = children.get(rank).and_then(|c| c.get(name)) {
                    let mut row = start;
                    for &kid in kids {
                        next_runs.push((kid, row));
                        row += name_counts[kid];
                    }
                }
            }
            runs = next_runs;
        }

        Ok(ClassificationTable {
            ladder: self.ladder.clone(),
            rows,
            columns,
            name_counts,
        })
    }
}
