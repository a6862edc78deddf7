/// Common names for taxa above species (`higher_taxa_processed.json`)
use crate::bio::gbif::NameUsageSource;
use crate::bio::trees::TreeDataset;
use crate::{EggcycError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HigherTaxon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gbif_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outcome of a refresh against GBIF
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub requested: usize,
    pub added: usize,
    pub failed: usize,
    /// Set when a network error cut the refresh short
    pub interrupted: bool,
}

/// In-memory copy of the higher-taxa cache. Changes stay in memory until `save`.
#[derive(Debug, Clone, Default)]
pub struct HigherTaxaCache {
    taxa: BTreeMap<String, HigherTaxon>,
    dirty: bool,
}

impl HigherTaxaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the cache; a missing file gives an empty cache
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No higher taxa cache at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        let contents = fs::read_to_string(path)?;
        let taxa: BTreeMap<String, HigherTaxon> = serde_json::from_str(&contents)?;
        info!("Read {} taxa from {}", taxa.len(), path.display());
        Ok(Self { taxa, dirty: false })
    }

    /// Write pretty JSON with sorted keys and clear the dirty flag
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!("Writing higher taxa data to {}", path.display());
        let value = serde_json::to_value(&self.taxa)?;
        fs::write(path, serde_json::to_string_pretty(&value)?)?;
        self.dirty = false;
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.taxa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taxa.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&HigherTaxon> {
        self.taxa.get(name)
    }

    pub fn common_name(&self, name: &str) -> Option<&str> {
        self.taxa.get(name).and_then(|t| t.common_name.as_deref())
    }

    /// Record a GBIF common name for a taxon
    pub fn record(&mut self, name: &str, gbif_id: u64, common_name: &str) {
        let taxon = self.taxa.entry(name.to_string()).or_default();
        taxon.gbif_id = Some(gbif_id);
        taxon.common_name = Some(common_name.to_string());
        self.dirty = true;
    }

    /// Higher taxa in the dataset's classifications without a cached common
    /// name, mapped to their GBIF usage key
    pub fn names_needing_lookup(&self, dataset: &TreeDataset) -> BTreeMap<String, u64> {
        let mut needed = BTreeMap::new();
        for (species, classification) in dataset.with_classification() {
            for entry in classification {
                if entry.rank.eq_ignore_ascii_case("SPECIES") {
                    continue;
                }
                if self.common_name(&entry.name).is_some() {
                    continue;
                }
                match entry.key {
                    Some(key) => {
                        needed.insert(entry.name.clone(), key);
                    }
                    None => debug!("No GBIF key for {} (from {})", entry.name, species),
                }
            }
        }
        needed
    }

    pub fn refresh<S: NameUsageSource + ?Sized>(
        &mut self,
        dataset: &TreeDataset,
        source: &S,
    ) -> Result<RefreshSummary> {
        self.refresh_with_progress(dataset, source, |_, _, _| {})
    }

    /// Look up every name missing a common name. A lookup is only accepted
    /// when GBIF echoes the requested key and supplies a vernacular name.
    /// Network failures stop the refresh without an error; nothing is retried.
    pub fn refresh_with_progress<S, F>(
        &mut self,
        dataset: &TreeDataset,
        source: &S,
        mut progress: F,
    ) -> Result<RefreshSummary>
    where
        S: NameUsageSource + ?Sized,
        F: FnMut(usize, usize, &str),
    {
        let needed = self.names_needing_lookup(dataset);
        let mut summary = RefreshSummary {
            requested: needed.len(),
            ..Default::default()
        };
        info!("Need to look up {} higher taxa", needed.len());

        for (i, (name, key)) in needed.iter().enumerate() {
            progress(i + 1, needed.len(), name);
            match source.name_usage(*key) {
                Ok(usage) => match (usage.key, usage.vernacular_name.as_deref()) {
                    (Some(k), Some(common)) if k == *key => {
                        debug!("{} is {}", name, common);
                        self.record(name, *key, common);
                        summary.added += 1;
                    }
                    _ => {
                        warn!("GBIF lookup for {} (key={}) failed: {:?}", name, key, usage);
                        summary.failed += 1;
                    }
                },
                Err(EggcycError::Network(e)) => {
                    warn!("GBIF lookup failed: {}", e);
                    summary.interrupted = true;
                    break;
                }
                Err(e) => {
                    warn!("GBIF lookup for {} (key={}) failed: {}", name, key, e);
                    summary.failed += 1;
                }
            }
        }
        Ok(summary)
    }
}
