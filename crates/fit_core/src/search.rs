use std::ops::ControlFlow;

use ahash::AHashSet;

use crate::assembler::combinations;
use crate::budget::{Budget, ResourceTotals};
use crate::scoring::score;
use crate::sorting::rank_results;
use crate::{FindRequest, FitError, ModulesByCategory, SearchSummary, SortRequest};

/// Combinations examined between cancellation checkpoints.
pub const CHECKPOINT_INTERVAL: u64 = 4096;

/// Receives progress from a running search and decides whether it continues.
pub trait SearchObserver {
    /// Called after every accepted result; `found` is the running total.
    fn on_found(&mut self, found: usize) -> ControlFlow<()> {
        let _ = found;
        ControlFlow::Continue(())
    }

    /// Called every `CHECKPOINT_INTERVAL` examined combinations, accepted or not.
    fn on_checkpoint(&mut self, examined: u64) -> ControlFlow<()> {
        let _ = examined;
        ControlFlow::Continue(())
    }
}

/// Runs to completion without reporting.
impl SearchObserver for () {}

/// Rejects catalogs where a module sits under the wrong category or an index
/// repeats within one category.
pub fn validate_catalog(pool: &ModulesByCategory) -> Result<(), FitError> {
    for (&listed, modules) in pool {
        let mut seen = AHashSet::new();
        for module in modules {
            let actual = module.category();
            if actual != listed {
                return Err(FitError::CategoryMismatch {
                    listed,
                    actual,
                    index: module.index,
                });
            }
            if !seen.insert(module.index) {
                return Err(FitError::DuplicateIndex {
                    category: listed,
                    index: module.index,
                });
            }
        }
    }
    Ok(())
}

/// Checks budgets, requested counts and catalog shape before any enumeration.
///
/// A negative count for any category is rejected like a zero total.
pub fn validate_request(request: &FindRequest) -> Result<(), FitError> {
    let budget = Budget::new(request.cpu_budget, request.pg_budget);
    let negative_count = request.num_modules.values().any(|&n| n < 0);
    if !budget.is_valid() || negative_count || request.total_modules() <= 0 {
        return Err(FitError::InvalidRequest);
    }
    validate_catalog(&request.modules_by_category)
}

/// Enumerates, filters and scores every loadout a request allows, then ranks
/// the survivors by the request's sort keys.
///
/// A pool too small for its requested count is not an error; it simply yields
/// no results. Returns `FitError::Cancelled` if the observer breaks.
pub fn find_combinations(
    request: &FindRequest,
    observer: &mut impl SearchObserver,
) -> Result<SearchSummary, FitError> {
    validate_request(request)?;
    let budget = Budget::new(request.cpu_budget, request.pg_budget);

    let mut results = Vec::new();
    let mut examined = 0u64;
    for combination in combinations(&request.modules_by_category, &request.num_modules) {
        examined += 1;
        if examined % CHECKPOINT_INTERVAL == 0 && observer.on_checkpoint(examined).is_break() {
            return Err(FitError::Cancelled);
        }
        if !budget.admits(ResourceTotals::of(combination.modules.iter().copied())) {
            continue;
        }
        results.push(score(&combination));
        if observer.on_found(results.len()).is_break() {
            return Err(FitError::Cancelled);
        }
    }

    Ok(SearchSummary {
        results: rank_results(results, &request.sort_keys, request.make_unique),
        combinations_examined: examined,
    })
}

/// Re-ranks a previously computed result set without recomputing it.
pub fn sort_request(mut request: SortRequest) -> SortRequest {
    let results = std::mem::take(&mut request.results);
    request.results = rank_results(results, &request.sort_keys, request.make_unique);
    request
}
