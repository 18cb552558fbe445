use super::*;
use crate::test_fixtures::{
    afterburner, battery, blank_result, dps, find_request, microwarpdrive, neutralizer, nosferatu,
    pool, smartbomb,
};

mod performance;
mod search;

// --- Shared test helpers ------------------------------------------------

const EPS: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < EPS,
        "{what}: expected {expected}, got {actual}"
    );
}

/// Scores the single combination made of exactly `modules`.
fn score_all(modules: &[Module]) -> LoadoutResult {
    let combination = Combination {
        ordinal: 0,
        modules: modules.iter().collect(),
    };
    score(&combination)
}

fn ids(results: &[LoadoutResult]) -> Vec<u64> {
    results.iter().map(|r| r.id).collect()
}
