//! Lazy fixed-size subset enumeration.
//!
//! Subsets are produced by advancing an index vector in lexicographic order,
//! so memory stays at one index vector regardless of how many subsets exist.

/// Yields every `size`-element subset of `0..len` as ascending index lists.
///
/// `size == 0` yields one empty subset; `size > len` yields nothing. The
/// `up_to` form walks every size from 0 to its limit, smallest first.
#[derive(Debug, Clone)]
pub struct IndexSubsets {
    len: usize,
    indices: Vec<usize>,
    max_size: usize,
    started: bool,
    done: bool,
}

impl IndexSubsets {
    pub fn new(len: usize, size: usize) -> Self {
        Self {
            len,
            indices: (0..size).collect(),
            max_size: size,
            started: false,
            done: size > len,
        }
    }

    /// Every subset with `0..=min(limit, len)` elements.
    pub fn up_to(len: usize, limit: usize) -> Self {
        Self {
            len,
            indices: Vec::new(),
            max_size: limit.min(len),
            started: false,
            done: false,
        }
    }

    /// Moves to the next index vector of the current size; returns `false`
    /// once that size is exhausted.
    fn advance(&mut self) -> bool {
        let size = self.indices.len();
        // Rightmost position that can still move right.
        let Some(pos) = (0..size)
            .rev()
            .find(|&i| self.indices[i] < self.len - size + i)
        else {
            return false;
        };
        self.indices[pos] += 1;
        for i in pos + 1..size {
            self.indices[i] = self.indices[i - 1] + 1;
        }
        true
    }
}

impl Iterator for IndexSubsets {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
        } else if !self.advance() {
            let size = self.indices.len();
            if size >= self.max_size {
                self.done = true;
                return None;
            }
            self.indices = (0..=size).collect();
        }
        Some(self.indices.clone())
    }
}

/// `C(n, k)`, or `None` if it does not fit in a `u64`.
pub fn binomial(n: u64, k: u64) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        // acc * (n - i) is always divisible by (i + 1) at this point.
        acc = acc.checked_mul(u128::from(n - i))? / u128::from(i + 1);
    }
    u64::try_from(acc).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn subsets<T>(pool: &[T], size: usize) -> impl Iterator<Item = Vec<&T>> + '_ {
        IndexSubsets::new(pool.len(), size)
            .map(move |indices| indices.into_iter().map(|i| &pool[i]).collect())
    }

    #[test]
    fn yields_binomial_count_without_duplicates() {
        for n in 0..=9usize {
            for r in 0..=n {
                let all: Vec<Vec<usize>> = IndexSubsets::new(n, r).collect();
                let distinct: HashSet<&Vec<usize>> = all.iter().collect();
                let expected = binomial(n as u64, r as u64).unwrap();
                assert_eq!(all.len() as u64, expected, "C({n}, {r})");
                assert_eq!(distinct.len(), all.len(), "duplicates for C({n}, {r})");
            }
        }
    }

    #[test]
    fn zero_size_yields_single_empty_subset() {
        let pool = [1, 2, 3];
        let all: Vec<Vec<&i32>> = subsets(&pool, 0).collect();
        assert_eq!(all, vec![Vec::<&i32>::new()]);
    }

    #[test]
    fn zero_size_of_empty_pool_yields_single_empty_subset() {
        let pool: [i32; 0] = [];
        assert_eq!(subsets(&pool, 0).count(), 1);
    }

    #[test]
    fn oversized_request_yields_nothing() {
        let pool = [1, 2];
        assert_eq!(subsets(&pool, 3).count(), 0);
    }

    #[test]
    fn preserves_source_order() {
        let pool = ['a', 'b', 'c', 'd'];
        let all: Vec<String> = subsets(&pool, 2)
            .map(|s| s.into_iter().collect())
            .collect();
        assert_eq!(all, ["ab", "ac", "ad", "bc", "bd", "cd"]);
    }

    #[test]
    fn range_variant_covers_every_size_up_to_limit() {
        let sizes: Vec<usize> = IndexSubsets::up_to(4, 2).map(|s| s.len()).collect();
        // 1 empty + 4 singles + 6 pairs
        assert_eq!(sizes.len(), 11);
        assert!(sizes.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(IndexSubsets::up_to(4, 10).count(), 16);
    }

    #[test]
    fn range_variant_of_empty_pool_is_just_the_empty_subset() {
        let all: Vec<Vec<usize>> = IndexSubsets::up_to(0, 3).collect();
        assert_eq!(all, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn large_pool_is_streamed() {
        // C(300, 2) subsets without materializing them up front.
        let mut iter = IndexSubsets::new(300, 2);
        assert_eq!(iter.next(), Some(vec![0, 1]));
        assert_eq!(iter.last(), Some(vec![298, 299]));
        assert_eq!(IndexSubsets::new(300, 2).count(), 44_850);
    }

    #[test]
    fn binomial_edges() {
        assert_eq!(binomial(5, 0), Some(1));
        assert_eq!(binomial(5, 5), Some(1));
        assert_eq!(binomial(5, 6), Some(0));
        assert_eq!(binomial(52, 5), Some(2_598_960));
        assert_eq!(binomial(400, 200), None);
    }
}
