//! Tabular input for evaluation.
//!
//! # Overview
//!
//! A [`Dataset`] is a set of named, equal-length [`Column`]s. Two numeric
//! columns are picked out by the caller as targets and predictions; any
//! number of further columns may be declared as grouping columns.
//!
//! # Missing Values
//!
//! Missing numeric values are represented as `f64::NAN`.
//!
//! # Grouping
//!
//! [`Dataset::partition`] splits the rows into [`Group`]s ordered by
//! ascending [`GroupKey`]. An ungrouped dataset is a single group with an
//! empty key.

mod dataset;
mod groups;

pub use dataset::{Column, Dataset, DatasetBuilder, DatasetError};
pub use groups::{Group, GroupKey, GroupValue, Partition};
