/// Species common names from the USDA PLANTS database export
use crate::{EggcycError, Result};
use flate2::read::GzDecoder;
use regex::Regex;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Synonym symbols whose rows we still accept as accepted names
const ACCEPTED_SYNONYMS: &[&str] = &["", "MADO4"];

#[derive(Debug, Clone, Default)]
pub struct UsdaNames {
    names: HashMap<String, String>,
}

impl UsdaNames {
    /// Read a gzipped USDA CSV export
    pub fn from_csv_gz<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let names = Self::from_reader(GzDecoder::new(file))?;
        info!("Read {} USDA common names from {}", names.len(), path.display());
        Ok(names)
    }

    /// Columns: symbol, synonym symbol, scientific name with author, common name, ...
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        // Capitalized genus then lower-case epithet; authors and infraspecific parts dropped
        let binomial = Regex::new(r"^([A-Z][a-z]+\s[a-z]+)\b")
            .map_err(|e| EggcycError::Other(format!("Bad species pattern: {}", e)))?;

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut names = HashMap::new();
        for row in csv_reader.records() {
            let row = row.map_err(|e| EggcycError::Serialization(format!("USDA CSV: {}", e)))?;
            let (Some(synonym), Some(scientific)) = (row.get(1), row.get(2)) else {
                continue;
            };
            if !ACCEPTED_SYNONYMS.contains(&synonym) {
                continue;
            }
            if let Some(m) = binomial.captures(scientific).and_then(|c| c.get(1)) {
                names
                    .entry(m.as_str().to_string())
                    .or_insert_with(|| capitalize(row.get(3).unwrap_or("")));
            }
        }
        Ok(Self { names })
    }

    /// Common name for a species; `Some("")` when USDA lists the species without one
    pub fn get(&self, species: &str) -> Option<&str> {
        self.names.get(species).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// First letter upper case, the rest lower case
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}
