use crate::bio::gbif::DEFAULT_GBIF_URL;
use crate::bio::ott::DEFAULT_OTT_URL;
use crate::bio::taxonomy::{Rank, RankLadder};
use crate::core::classification::GapPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub table: TableConfig,
    pub gbif: GbifConfig,
    pub ott: OttConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Hand-maintained tree list
    pub trees_file: PathBuf,
    /// Tree list with looked-up data added
    pub processed_file: PathBuf,
    pub higher_taxa_file: PathBuf,
    /// Gzipped USDA PLANTS export
    pub usda_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub output: PathBuf,
    /// Table columns, kingdom first
    pub ranks: Vec<Rank>,
    /// Columns whose cells are drawn with rotated text
    pub rotated_ranks: Vec<Rank>,
    pub gap_policy: GapPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GbifConfig {
    pub base_url: String,
    pub language: String,
    pub timeout_secs: u64,
}

/// Open Tree of Life TNRS service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OttConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            trees_file: PathBuf::from("trees.json"),
            processed_file: PathBuf::from("trees_processed.json"),
            higher_taxa_file: PathBuf::from("higher_taxa_processed.json"),
            usda_file: PathBuf::from("usda_db_2024-12-02.csv.gz"),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("src/_includes/class_table.html"),
            ranks: Rank::ALL.to_vec(),
            rotated_ranks: vec![Rank::Kingdom, Rank::Phylum, Rank::Class],
            gap_policy: GapPolicy::Skip,
        }
    }
}

impl Default for GbifConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GBIF_URL.to_string(),
            language: "en".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for OttConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OTT_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl TableConfig {
    pub fn ladder(&self) -> Result<RankLadder, crate::EggcycError> {
        RankLadder::new(self.ranks.clone())
    }
}

impl GbifConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl OttConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, crate::EggcycError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| crate::EggcycError::Config(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), crate::EggcycError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| crate::EggcycError::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
