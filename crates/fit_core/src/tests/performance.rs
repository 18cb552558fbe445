use super::*;

#[test]
fn scores_a_large_pair_search_quickly() {
    let mut rng = test_fixtures::make_rng();
    // C(300, 2) = 44_850 pairs, all feasible.
    let mut request = find_request(
        1000.0,
        1000.0,
        test_fixtures::random_dps_pool(&mut rng, 300),
        &[(Category::Dps, 2)],
    );
    request.sort_keys = vec![SortKey::desc(SortField::DpsIncrease)];

    let start = std::time::Instant::now();
    let summary = find_combinations(&request, &mut ()).unwrap();
    let elapsed = start.elapsed();

    assert_eq!(summary.results.len(), 44_850);
    assert!(
        elapsed.as_secs_f64() < 10.0,
        "expected a 300-module pair search under 10s, took {elapsed:.2?}"
    );
    let best = summary.results[0].dps_increase;
    assert!(summary.results.iter().all(|r| r.dps_increase <= best));
}
