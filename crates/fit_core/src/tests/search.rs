use std::ops::ControlFlow;

use serde_json::json;

use super::*;

/// Breaks on the first callback of either kind.
struct StopImmediately;

impl SearchObserver for StopImmediately {
    fn on_found(&mut self, _found: usize) -> ControlFlow<()> {
        ControlFlow::Break(())
    }

    fn on_checkpoint(&mut self, _examined: u64) -> ControlFlow<()> {
        ControlFlow::Break(())
    }
}

#[derive(Default)]
struct Recorder {
    found: Vec<usize>,
    checkpoints: Vec<u64>,
}

impl SearchObserver for Recorder {
    fn on_found(&mut self, found: usize) -> ControlFlow<()> {
        self.found.push(found);
        ControlFlow::Continue(())
    }

    fn on_checkpoint(&mut self, examined: u64) -> ControlFlow<()> {
        self.checkpoints.push(examined);
        ControlFlow::Continue(())
    }
}

#[test]
fn budget_filter_is_inclusive() {
    let request = find_request(
        22.0,
        2.0,
        [dps(1, 20.0, 1.0, 1.1, 10.0), dps(2, 2.0, 1.0, 1.08, 8.0)],
        &[(Category::Dps, 2)],
    );
    let summary = find_combinations(&request, &mut ()).unwrap();
    assert_eq!(summary.results.len(), 1);
    assert_eq!(summary.combinations_examined, 1);
    let only = &summary.results[0];
    assert_close(only.total_cpu, 22.0, "cpu");
    assert_close(only.dps_increase, 40.488_385_273_652_26, "dps");
}

#[test]
fn over_budget_loadouts_are_dropped() {
    let request = find_request(
        21.9,
        2.0,
        [dps(1, 20.0, 1.0, 1.1, 10.0), dps(2, 2.0, 1.0, 1.08, 8.0)],
        &[(Category::Dps, 2)],
    );
    let summary = find_combinations(&request, &mut ()).unwrap();
    assert!(summary.results.is_empty());
    assert_eq!(summary.combinations_examined, 1);
}

#[test]
fn powergrid_is_checked_too() {
    let request = find_request(
        100.0,
        1.5,
        [dps(1, 1.0, 1.0, 1.1, 10.0), dps(2, 1.0, 1.0, 1.08, 8.0)],
        &[(Category::Dps, 2)],
    );
    assert!(find_combinations(&request, &mut ())
        .unwrap()
        .results
        .is_empty());
}

#[test]
fn results_keep_enumeration_ids_without_sort_keys() {
    let request = find_request(
        100.0,
        100.0,
        [
            dps(1, 1.0, 1.0, 1.1, 10.0),
            dps(2, 1.0, 1.0, 1.1, 10.0),
            dps(3, 1.0, 1.0, 1.1, 10.0),
        ],
        &[(Category::Dps, 2)],
    );
    let summary = find_combinations(&request, &mut ()).unwrap();
    assert_eq!(ids(&summary.results), vec![0, 1, 2]);
}

#[test]
fn request_sort_keys_and_uniqueness_apply() {
    let mut request = find_request(
        100.0,
        100.0,
        [
            dps(1, 1.0, 1.0, 1.10, 10.0),
            dps(2, 1.0, 1.0, 1.08, 8.0),
            dps(3, 1.0, 1.0, 1.06, 6.0),
            dps(4, 1.0, 1.0, 1.04, 4.0),
        ],
        &[(Category::Dps, 2)],
    );
    request.sort_keys = vec![SortKey::desc(SortField::DpsIncrease)];
    request.make_unique = true;

    let summary = find_combinations(&request, &mut ()).unwrap();
    let picked: Vec<Vec<u32>> = summary
        .results
        .iter()
        .map(|r| r.modules.iter().map(|m| m.index).collect())
        .collect();
    assert_eq!(picked, vec![vec![1, 2], vec![3, 4]]);
    assert_eq!(summary.combinations_examined, 6);
}

#[test]
fn invalid_budgets_are_rejected() {
    let modules = [dps(1, 1.0, 1.0, 1.1, 10.0)];
    for (cpu, pg) in [(0.0, 10.0), (10.0, 0.0), (-1.0, 10.0), (f64::NAN, 10.0)] {
        let request = find_request(cpu, pg, modules.clone(), &[(Category::Dps, 1)]);
        assert_eq!(
            find_combinations(&request, &mut ()),
            Err(FitError::InvalidRequest),
            "cpu={cpu} pg={pg}"
        );
    }
}

#[test]
fn zero_requested_modules_is_rejected() {
    let request = find_request(
        10.0,
        10.0,
        [dps(1, 1.0, 1.0, 1.1, 10.0)],
        &[(Category::Dps, 0)],
    );
    let err = find_combinations(&request, &mut ()).unwrap_err();
    assert_eq!(err, FitError::InvalidRequest);
    assert_eq!(
        err.to_string(),
        "Please enter valid budget and number of modules."
    );
}

#[test]
fn negative_counts_are_an_invalid_request() {
    for counts in [json!({"dps": -1}), json!({"dps": 2, "battery": -1})] {
        let request: FindRequest = serde_json::from_value(json!({
            "cpuBudget": 100,
            "pgBudget": 100,
            "modulesByCategory": {
                "dps": [
                    {"type": "dps", "index": 1, "cpu": 1, "pg": 1, "dmgMulti": 1.1, "rofBonus": 10},
                    {"type": "dps", "index": 2, "cpu": 1, "pg": 1, "dmgMulti": 1.1, "rofBonus": 10}
                ]
            },
            "numModules": counts
        }))
        .unwrap();
        assert_eq!(
            find_combinations(&request, &mut ()),
            Err(FitError::InvalidRequest),
            "{counts}"
        );
    }
}

#[test]
fn result_modules_follow_the_callers_category_order() {
    let request: FindRequest = serde_json::from_value(json!({
        "cpuBudget": 100,
        "pgBudget": 100,
        "modulesByCategory": {
            "battery": [
                {"type": "battery", "index": 1, "cpu": 20, "pg": 1,
                 "capacitorBonus": 10, "drainResistanceBonus": -20}
            ],
            "dps": [
                {"type": "dps", "index": 1, "cpu": 1, "pg": 1, "dmgMulti": 1.1, "rofBonus": 10}
            ]
        },
        "numModules": {"dps": 1, "battery": 1}
    }))
    .unwrap();
    let summary = find_combinations(&request, &mut ()).unwrap();
    let order: Vec<String> = summary.results[0]
        .modules
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(order, ["battery#1", "dps#1"]);
}

#[test]
fn too_small_pool_is_not_an_error() {
    let request = find_request(
        10.0,
        10.0,
        [dps(1, 1.0, 1.0, 1.1, 10.0)],
        &[(Category::Dps, 3)],
    );
    let summary = find_combinations(&request, &mut ()).unwrap();
    assert!(summary.results.is_empty());
}

#[test]
fn misfiled_module_is_rejected() {
    let mut request = find_request(10.0, 10.0, Vec::new(), &[(Category::Dps, 1)]);
    request
        .modules_by_category
        .insert(Category::Dps, vec![battery(1, 10.0, -20.0)]);
    assert_eq!(
        find_combinations(&request, &mut ()),
        Err(FitError::CategoryMismatch {
            listed: Category::Dps,
            actual: Category::CapBattery,
            index: 1,
        })
    );
}

#[test]
fn duplicate_index_is_rejected() {
    let request = find_request(
        10.0,
        10.0,
        [dps(1, 1.0, 1.0, 1.1, 10.0), dps(1, 2.0, 1.0, 1.08, 8.0)],
        &[(Category::Dps, 1)],
    );
    assert_eq!(
        validate_request(&request),
        Err(FitError::DuplicateIndex {
            category: Category::Dps,
            index: 1,
        })
    );
}

#[test]
fn observer_sees_running_totals() {
    let request = find_request(
        100.0,
        100.0,
        [
            dps(1, 1.0, 1.0, 1.1, 10.0),
            dps(2, 1.0, 1.0, 1.1, 10.0),
            dps(3, 1.0, 1.0, 1.1, 10.0),
        ],
        &[(Category::Dps, 1)],
    );
    let mut recorder = Recorder::default();
    find_combinations(&request, &mut recorder).unwrap();
    assert_eq!(recorder.found, vec![1, 2, 3]);
    assert!(recorder.checkpoints.is_empty());
}

#[test]
fn breaking_observer_cancels() {
    let request = find_request(
        100.0,
        100.0,
        [dps(1, 1.0, 1.0, 1.1, 10.0), dps(2, 1.0, 1.0, 1.1, 10.0)],
        &[(Category::Dps, 1)],
    );
    assert_eq!(
        find_combinations(&request, &mut StopImmediately),
        Err(FitError::Cancelled)
    );
}

#[test]
fn checkpoints_fire_even_when_nothing_fits() {
    let mut rng = test_fixtures::make_rng();
    // C(100, 2) = 4950 combinations, none of which fit a 1 cpu budget.
    let request = find_request(
        1.0,
        100.0,
        test_fixtures::random_dps_pool(&mut rng, 100),
        &[(Category::Dps, 2)],
    );
    let mut recorder = Recorder::default();
    let summary = find_combinations(&request, &mut recorder).unwrap();
    assert!(summary.results.is_empty());
    assert_eq!(summary.combinations_examined, 4950);
    assert_eq!(recorder.checkpoints, vec![CHECKPOINT_INTERVAL]);

    assert_eq!(
        find_combinations(&request, &mut StopImmediately),
        Err(FitError::Cancelled)
    );
}

#[test]
fn sort_request_reorders_without_recomputing() {
    let mut first = blank_result(0, &[(Category::Dps, 1)]);
    first.total_gj = 5.0;
    let mut second = blank_result(1, &[(Category::Dps, 2)]);
    second.total_gj = 1.0;
    let request = SortRequest {
        results: vec![first.clone(), second.clone()],
        sort_keys: vec![SortKey::asc(SortField::TotalGj)],
        make_unique: false,
    };
    let sorted = sort_request(request);
    assert_eq!(sorted.results, vec![second, first]);
    assert_eq!(sorted.sort_keys, vec![SortKey::asc(SortField::TotalGj)]);
}
