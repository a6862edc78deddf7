//! Shared fixtures for the eggcyc integration tests
#![allow(dead_code)]

use eggcyc::{ClassificationEntry, Rank, TreeDataset, TreeRecord};
use std::path::PathBuf;
use tempfile::TempDir;

/// Full KINGDOM..GENUS lineage plus a SPECIES entry
pub fn lineage(names: [&str; 6], species: &str) -> Vec<ClassificationEntry> {
    let mut entries: Vec<ClassificationEntry> = Rank::ALL[..6]
        .iter()
        .zip(names)
        .map(|(rank, name)| ClassificationEntry::new(*rank, name))
        .collect();
    entries.push(ClassificationEntry::new(Rank::Species, species));
    entries
}

/// Oak family lineage ending in `genus`
pub fn fagaceae(genus: &str, species: &str) -> Vec<ClassificationEntry> {
    lineage(
        [
            "Plantae",
            "Tracheophyta",
            "Magnoliopsida",
            "Fagales",
            "Fagaceae",
            genus,
        ],
        species,
    )
}

pub fn maple(species: &str) -> Vec<ClassificationEntry> {
    lineage(
        [
            "Plantae",
            "Tracheophyta",
            "Magnoliopsida",
            "Sapindales",
            "Sapindaceae",
            "Acer",
        ],
        species,
    )
}

/// A small dataset: two oaks, a beech, a maple and a species without a classification
pub fn sample_dataset() -> TreeDataset {
    let mut trees = TreeDataset::new();
    trees.insert(
        "Quercus rubra",
        TreeRecord::new()
            .with_common_name("Red oak")
            .with_classification(fagaceae("Quercus", "Quercus rubra")),
    );
    trees.insert(
        "Quercus alba",
        TreeRecord::new()
            .with_common_name("White oak")
            .with_classification(fagaceae("Quercus", "Quercus alba")),
    );
    trees.insert(
        "Fagus grandifolia",
        TreeRecord::new()
            .with_common_name("American beech")
            .with_classification(fagaceae("Fagus", "Fagus grandifolia")),
    );
    trees.insert(
        "Acer saccharum",
        TreeRecord::new()
            .with_common_name("Sugar maple")
            .with_classification(maple("Acer saccharum")),
    );
    trees.insert("Ginkgo biloba", TreeRecord::new().with_common_name("Ginkgo"));
    trees
}

/// Temporary directory holding data files for one test
pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        TestEnvironment {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.temp_dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path(relative);
        std::fs::write(&path, contents).expect("Failed to write fixture");
        path
    }
}
