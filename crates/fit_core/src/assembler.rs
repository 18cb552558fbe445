//! Cartesian assembly of per-category subsets into candidate loadouts.
//!
//! Each category contributes a stream of candidate subsets. The product is
//! walked lazily with an odometer of subset cursors, and only combinations
//! whose per-category counts equal the requested targets are yielded.

use crate::subsets::{binomial, IndexSubsets};
use crate::{Category, Module, ModulesByCategory, NumModules};

/// One candidate loadout. Modules are grouped by category in plan order.
#[derive(Debug, Clone)]
pub struct Combination<'a> {
    /// Position among the count-matching combinations, starting at 0.
    pub ordinal: u64,
    pub modules: Vec<&'a Module>,
}

/// Candidate subsets contributed by one category. `subsets` is a fresh
/// cursor, cloned whenever the odometer wraps this position.
#[derive(Debug, Clone)]
pub struct CategoryCandidates<'a> {
    pub category: Category,
    pub modules: &'a [Module],
    pub subsets: IndexSubsets,
}

impl<'a> CategoryCandidates<'a> {
    /// Subsets of exactly `size` modules.
    pub fn exact(category: Category, modules: &'a [Module], size: usize) -> Self {
        Self {
            category,
            modules,
            subsets: IndexSubsets::new(modules.len(), size),
        }
    }

    fn is_empty(&self) -> bool {
        self.subsets.clone().next().is_none()
    }
}

/// Requested size for a category. Negative counts map to 0 here and make
/// `Combinations` yield nothing.
fn target_size(count: i64) -> usize {
    usize::try_from(count).unwrap_or(0)
}

/// Builds the per-category candidates for a request.
///
/// Categories come in the pool's key order, followed by categories that are
/// only targeted. Categories without a target contribute only the empty
/// subset; a target on a category missing from the pool leaves no candidates,
/// so nothing is produced.
pub fn plan<'a>(pool: &'a ModulesByCategory, targets: &NumModules) -> Vec<CategoryCandidates<'a>> {
    let target_only = targets
        .keys()
        .copied()
        .filter(|category| !pool.contains_key(category));
    pool.keys()
        .copied()
        .chain(target_only)
        .map(|category| {
            let modules = pool.get(&category).map_or(&[][..], Vec::as_slice);
            let size = targets.get(&category).copied().map_or(0, target_size);
            CategoryCandidates::exact(category, modules, size)
        })
        .collect()
}

/// Upper bound on the number of combinations a request can produce, or
/// `None` if it overflows. A negative count allows none.
pub fn combination_count(pool: &ModulesByCategory, targets: &NumModules) -> Option<u64> {
    if targets.values().any(|&size| size < 0) {
        return Some(0);
    }
    targets.iter().try_fold(1u64, |acc, (category, &size)| {
        let available = pool.get(category).map_or(0, Vec::len) as u64;
        acc.checked_mul(binomial(available, u64::try_from(size).ok()?)?)
    })
}

/// Lazy Cartesian product over category candidates, filtered to exact counts.
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    groups: Vec<CategoryCandidates<'a>>,
    targets: Vec<(Category, usize)>,
    cursors: Vec<IndexSubsets>,
    current: Vec<Vec<usize>>,
    next_ordinal: u64,
    done: bool,
}

impl<'a> Combinations<'a> {
    pub fn new(groups: Vec<CategoryCandidates<'a>>, targets: &NumModules) -> Self {
        let negative_target = targets.values().any(|&count| count < 0);
        let targets: Vec<(Category, usize)> = targets
            .iter()
            .map(|(&category, &count)| (category, target_size(count)))
            .collect();
        let nothing_requested = targets.iter().all(|&(_, count)| count == 0);
        let empty_group = groups.iter().any(CategoryCandidates::is_empty);

        let mut cursors = Vec::with_capacity(groups.len());
        let mut current = Vec::with_capacity(groups.len());
        if !empty_group {
            for group in &groups {
                let mut cursor = group.subsets.clone();
                current.push(cursor.next().unwrap_or_default());
                cursors.push(cursor);
            }
        }

        Self {
            groups,
            targets,
            cursors,
            current,
            next_ordinal: 0,
            done: nothing_requested || negative_target || empty_group,
        }
    }

    fn modules(&self) -> Vec<&'a Module> {
        self.groups
            .iter()
            .zip(&self.current)
            .flat_map(|(group, indices)| indices.iter().map(|&i| &group.modules[i]))
            .collect()
    }

    /// Odometer step: the last category turns fastest.
    fn advance(&mut self) {
        for pos in (0..self.groups.len()).rev() {
            if let Some(next) = self.cursors[pos].next() {
                self.current[pos] = next;
                return;
            }
            let mut restarted = self.groups[pos].subsets.clone();
            match restarted.next() {
                Some(first) => {
                    self.current[pos] = first;
                    self.cursors[pos] = restarted;
                }
                None => break,
            }
        }
        self.done = true;
    }

    fn counts_match(&self, modules: &[&Module]) -> bool {
        self.targets.iter().all(|&(category, count)| {
            modules.iter().filter(|m| m.category() == category).count() == count
        })
    }
}

impl<'a> Iterator for Combinations<'a> {
    type Item = Combination<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let modules = self.modules();
            self.advance();
            if self.counts_match(&modules) {
                let ordinal = self.next_ordinal;
                self.next_ordinal += 1;
                return Some(Combination { ordinal, modules });
            }
        }
        None
    }
}

/// All count-matching combinations for a pool and per-category targets.
pub fn combinations<'a>(pool: &'a ModulesByCategory, targets: &NumModules) -> Combinations<'a> {
    Combinations::new(plan(pool, targets), targets)
}
