/// Tree species dataset (`trees.json` / `trees_processed.json`)
use crate::bio::ott::OttSource;
use crate::bio::taxonomy::ClassificationEntry;
use crate::bio::usda::UsdaNames;
use crate::{EggcycError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Data held for one tree species, keyed in the dataset by its scientific name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,

    /// Open Tree of Life taxonomy id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ott_id: Option<u64>,

    #[serde(
        rename = "gbif_classification",
        alias = "classification",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub classification: Option<Vec<ClassificationEntry>>,

    /// Hand-maintained fields we don't interpret (notes, skip flags, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TreeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_common_name(mut self, name: impl Into<String>) -> Self {
        self.common_name = Some(name.into());
        self
    }

    pub fn with_classification(mut self, classification: Vec<ClassificationEntry>) -> Self {
        self.classification = Some(classification);
        self
    }

    pub fn with_ott_id(mut self, ott_id: u64) -> Self {
        self.ott_id = Some(ott_id);
        self
    }

    /// Crosses and other entries marked `skip` are left out of taxonomy lookups
    pub fn is_skipped(&self) -> bool {
        self.extra.contains_key("skip")
    }
}

/// All tree species, iterated in species-name order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeDataset {
    trees: BTreeMap<String, TreeRecord>,
}

impl TreeDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the dataset from a JSON object keyed by species name
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let dataset = Self::from_json(&contents)?;
        info!("Read {} trees from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Pretty JSON with sorted keys so that git diffs stay readable
    pub fn to_json(&self) -> Result<String> {
        // Going through Value sorts the flattened extra fields along with ours
        let value = serde_json::to_value(self)?;
        Ok(serde_json::to_string_pretty(&value)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!("Writing {} trees to {}", self.len(), path.display());
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn insert(&mut self, species: impl Into<String>, record: TreeRecord) {
        self.trees.insert(species.into(), record);
    }

    pub fn get(&self, species: &str) -> Option<&TreeRecord> {
        self.trees.get(species)
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TreeRecord)> {
        self.trees.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Species that carry a classification, with that classification
    pub fn with_classification(&self) -> impl Iterator<Item = (&str, &[ClassificationEntry])> {
        self.trees.iter().filter_map(|(species, record)| {
            record
                .classification
                .as_deref()
                .map(|classification| (species.as_str(), classification))
        })
    }

    /// Replace records with their already-processed versions where we have one
    pub fn merge_data_from(&mut self, processed: &TreeDataset) -> usize {
        let mut merged = 0;
        for (species, record) in self.trees.iter_mut() {
            if let Some(done) = processed.trees.get(species) {
                *record = done.clone();
                merged += 1;
            }
        }
        debug!("Merged {} processed records", merged);
        merged
    }

    /// Fill in missing common names from the USDA table, returning how many were added
    pub fn apply_common_names(&mut self, usda: &UsdaNames) -> usize {
        let mut added = 0;
        for (species, record) in self.trees.iter_mut() {
            if record.common_name.is_some() {
                continue;
            }
            match usda.get(species) {
                Some("") => warn!("No common name for {} in USDA database", species),
                Some(name) => {
                    record.common_name = Some(name.to_string());
                    added += 1;
                }
                None => warn!("Species {} not found in USDA database", species),
            }
        }
        added
    }

    /// Look up OTT ids for species without one, skipping entries marked `skip`.
    /// Failed lookups are logged and left for the next run.
    pub fn lookup_ott_ids<S, F>(&mut self, source: &S, mut progress: F) -> usize
    where
        S: OttSource + ?Sized,
        F: FnMut(usize, usize, &str),
    {
        let pending: Vec<String> = self
            .trees
            .iter()
            .filter(|(_, r)| r.ott_id.is_none() && !r.is_skipped())
            .map(|(species, _)| species.clone())
            .collect();
        info!("Need to look up {} OTT ids", pending.len());

        let mut added = 0;
        for (i, species) in pending.iter().enumerate() {
            progress(i + 1, pending.len(), species);
            match source.match_name(species) {
                Ok(Some(id)) => {
                    debug!("ott_id for {} is {}", species, id);
                    if let Some(record) = self.trees.get_mut(species) {
                        record.ott_id = Some(id);
                        added += 1;
                    }
                }
                Ok(None) => warn!("Failed lookup for {} (no TNRS match)", species),
                Err(e) => warn!("Failed lookup for {} ({})", species, e),
            }
        }
        added
    }

    /// OTT ids of all species that have one, in species order
    pub fn ott_ids(&self) -> Vec<u64> {
        self.trees.values().filter_map(|r| r.ott_id).collect()
    }

    pub fn common_name(&self, species: &str) -> Option<&str> {
        self.trees
            .get(species)
            .and_then(|r| r.common_name.as_deref())
    }

    /// URL path of a species page relative to the web root, e.g. `sp/red_oak.html`
    pub fn species_page(&self, species: &str) -> Result<String> {
        Ok(format!("sp/{}.html", self.slug(species)?))
    }

    /// Egg photo prefix relative to the web root, without the `1a.jpg` style suffix
    pub fn egg_photo_base(&self, species: &str) -> Result<String> {
        Ok(format!("photos/egg_{}_", self.slug(species)?))
    }

    fn slug(&self, species: &str) -> Result<String> {
        let common = self
            .common_name(species)
            .ok_or_else(|| EggcycError::MissingCommonName(species.to_string()))?;
        Ok(common.to_lowercase().replace(' ', "_"))
    }
}
