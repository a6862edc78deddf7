pub mod class_table;
pub mod common_names;
pub mod higher_taxa;
pub mod species;
