//! Fractional Ordering
//!
//! Sort keys are real numbers so an issue can be placed between two neighbours
//! without touching any other row. When repeated inserts between the same pair
//! shrink the gap below `MIN_SORT_GAP`, the whole column is resequenced.

/// Key given to the first issue in an empty column
pub const SORT_ORIGIN: f64 = 0.0;

/// Distance kept between an edge issue and the new one
pub const SORT_GAP: f64 = 1000.0;

/// Smallest neighbour gap still split by midpoint
pub const MIN_SORT_GAP: f64 = 1e-6;

/// Outcome of planning an insert between two neighbours
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Allocation {
    /// Use this key; no other row changes
    Key(f64),
    /// The gap is exhausted; resequence the column first
    Rebalance,
}

/// Compute a key between `prev` and `next` (either may be absent at a column edge)
pub fn allocate(prev: Option<f64>, next: Option<f64>) -> f64 {
    match (prev, next) {
        (None, None) => SORT_ORIGIN,
        (Some(p), None) => p + SORT_GAP,
        (None, Some(n)) => n - SORT_GAP,
        (Some(p), Some(n)) => (p + n) / 2.0,
    }
}

/// Like [`allocate`], but refuses keys that no longer separate the neighbours
pub fn plan_insert(prev: Option<f64>, next: Option<f64>) -> Allocation {
    if let (Some(p), Some(n)) = (prev, next) {
        let gap = n - p;
        if gap.is_nan() || gap < MIN_SORT_GAP {
            return Allocation::Rebalance;
        }
        let key = allocate(prev, next);
        if key <= p || key >= n {
            return Allocation::Rebalance;
        }
        return Allocation::Key(key);
    }
    let key = allocate(prev, next);
    if key.is_finite() {
        Allocation::Key(key)
    } else {
        Allocation::Rebalance
    }
}

/// Evenly spaced keys for `count` issues, starting at `SORT_ORIGIN`
pub fn resequenced_keys(count: usize) -> Vec<f64> {
    (0..count).map(|i| SORT_ORIGIN + i as f64 * SORT_GAP).collect()
}
