//! Composite result ordering and greedy uniqueness.

use std::cmp::Ordering;

use ahash::AHashSet;

use crate::{Category, LoadoutResult, SortDirection, SortField, SortKey};

/// A defined field value. Missing values are represented by `None` one level up.
#[derive(Debug, Clone, PartialEq)]
enum SortValue {
    Number(f64),
    Text(String),
}

impl SortValue {
    fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            _ => self.text().cmp(&other.text()),
        }
    }

    fn text(&self) -> String {
        match self {
            SortValue::Number(n) => n.to_string(),
            SortValue::Text(s) => s.to_lowercase(),
        }
    }
}

fn field_value(field: SortField, result: &LoadoutResult) -> Option<SortValue> {
    let number = match field {
        SortField::Modules => {
            let names: Vec<String> = result.modules.iter().map(ToString::to_string).collect();
            return Some(SortValue::Text(names.join(" ")));
        }
        SortField::Id => Some(result.id as f64),
        SortField::TotalCpu => Some(result.total_cpu),
        SortField::TotalPg => Some(result.total_pg),
        SortField::DpsIncrease => Some(result.dps_increase),
        SortField::SmartbombDps => Some(result.smartbomb_dps),
        SortField::SmartbombGjs => Some(result.smartbomb_gjs),
        SortField::SmartbombRange => Some(result.smartbomb_range),
        SortField::NeutAmount => Some(result.neut_amount),
        SortField::NeutGjs => Some(result.neut_gjs),
        SortField::NeutRange => Some(result.neut_range),
        SortField::NosAmount => Some(result.nos_amount),
        SortField::NosRange => Some(result.nos_range),
        SortField::CapBonus => Some(result.cap_bonus),
        SortField::DrainResistance => Some(result.drain_resistance),
        SortField::AbVelocity => result.ab_velocity,
        SortField::AbGj => result.ab_gj,
        SortField::MwdVelocity => result.mwd_velocity,
        SortField::MwdGj => result.mwd_gj,
        SortField::MwdSignature => result.mwd_signature,
        SortField::TotalGj => Some(result.total_gj),
    };
    number.map(SortValue::Number)
}

/// Orders two results on one key. Missing values rank above every defined
/// value, so they land last ascending and first descending.
fn compare_on(key: &SortKey, a: &LoadoutResult, b: &LoadoutResult) -> Ordering {
    let ordering = match (field_value(key.key, a), field_value(key.key, b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => x.compare(&y),
    };
    match key.direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Stable sort by `keys` in order; remaining ties keep their input order.
/// An empty key list leaves `results` untouched.
pub fn sort_results(results: &mut [LoadoutResult], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    results.sort_by(|a, b| {
        keys.iter()
            .map(|key| compare_on(key, a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

/// Keeps a result only if none of its modules were used by an earlier kept
/// result. Order-dependent: run it on sorted input.
pub fn retain_unique(results: Vec<LoadoutResult>) -> Vec<LoadoutResult> {
    let mut claimed: AHashSet<(Category, u32)> = AHashSet::new();
    results
        .into_iter()
        .filter(|result| {
            if result.modules.iter().any(|m| claimed.contains(&m.key())) {
                return false;
            }
            claimed.extend(result.modules.iter().map(|m| m.key()));
            true
        })
        .collect()
}

/// Sorts, then optionally de-duplicates.
pub fn rank_results(
    mut results: Vec<LoadoutResult>,
    keys: &[SortKey],
    make_unique: bool,
) -> Vec<LoadoutResult> {
    sort_results(&mut results, keys);
    if make_unique {
        retain_unique(results)
    } else {
        results
    }
}
