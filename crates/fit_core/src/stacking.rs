//! Stacking penalty for same-attribute bonuses.
//!
//! Bonuses are ranked strongest first; the bonus at rank `i` is scaled by
//! `exp(-(i / 2.67)^2)`, so the first applies fully and later ones fade out.

/// Divisor of the rank in the penalty exponent.
pub const STACKING_PENALTY_DIVISOR: f64 = 2.67;

/// Weight applied to the bonus at 0-based `rank`.
pub fn stacking_penalty(rank: usize) -> f64 {
    (-(rank as f64 / STACKING_PENALTY_DIVISOR).powi(2)).exp()
}

fn descending(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.into_iter().collect();
    sorted.sort_by(|a, b| b.total_cmp(a));
    sorted
}

/// Combined multiplier of additive bonuses: `Π (1 + b_i · p_i)`.
///
/// With no bonuses the result is `1.0`.
pub fn stacked_bonus(bonuses: impl IntoIterator<Item = f64>) -> f64 {
    descending(bonuses)
        .into_iter()
        .enumerate()
        .map(|(rank, bonus)| 1.0 + bonus * stacking_penalty(rank))
        .product()
}

/// Combined multiplier of reductions: `Π (1 − r_i · p_i)`.
///
/// Reductions are ranked by signed value, so a negative roll (a penalty) sorts
/// last and lengthens rather than shortens.
pub fn stacked_reduction(reductions: impl IntoIterator<Item = f64>) -> f64 {
    descending(reductions)
        .into_iter()
        .enumerate()
        .map(|(rank, reduction)| 1.0 - reduction * stacking_penalty(rank))
        .product()
}
