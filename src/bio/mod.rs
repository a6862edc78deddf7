pub mod gbif;
pub mod ott;
pub mod taxonomy;
pub mod trees;
pub mod usda;

pub use taxonomy::{ClassificationEntry, Rank, RankLadder};
pub use trees::{TreeDataset, TreeRecord};
