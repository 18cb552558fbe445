//! `fit_core`: loadout enumeration and scoring.
//!
//! No IO, no threads. Given per-category module pools, requested counts and
//! fitting budgets, enumerate every feasible loadout, score it, and rank the
//! result set.

pub mod assembler;
mod budget;
mod error;
mod scoring;
mod search;
mod sorting;
pub mod stacking;
pub mod subsets;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use assembler::{combination_count, combinations, Combination};
pub use budget::{Budget, ResourceTotals};
pub use error::FitError;
pub use scoring::{dps_increase, drain_resistance, score};
pub use search::{
    find_combinations, sort_request, validate_catalog, validate_request, SearchObserver,
    CHECKPOINT_INTERVAL,
};
pub use sorting::{rank_results, retain_unique, sort_results};
pub use types::*;

#[cfg(test)]
mod tests;
