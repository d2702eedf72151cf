//! IQA dataset provider
//!
//! Loads a database index of distorted images with subjective scores,
//! splits it by reference content for an experiment, and batches each split.

mod loader;
mod sample;
mod split;
mod synthetic;

pub use loader::{BatchIter, DataLoader, IqaBatch};
pub use sample::{Database, IqaSample};
pub use split::{split_database, DatasetSplits, SplitConfig};
pub use synthetic::synthetic_database;
