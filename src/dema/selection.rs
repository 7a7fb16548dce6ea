//! Pareto ranking of (objective, overlap) pairs and binary tournament.
//!
//! Both criteria are minimised: a point dominates another when it is no
//! worse on both and strictly better on one. Points are ordered by front
//! (non-dominated sorting), then objective, then input index.

use rand::Rng;

/// Outcome of comparing two points for dominance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParetoCompare {
    ADominatesB,
    Equal,
    BDominatesA,
}

/// Compares two `(objective, overlap)` points, lower is better on both.
pub fn pareto_compare(a: (f64, f64), b: (f64, f64)) -> ParetoCompare {
    let a_better = a.0 < b.0 || a.1 < b.1;
    let b_better = b.0 < a.0 || b.1 < a.1;
    match (a_better, b_better) {
        (true, false) => ParetoCompare::ADominatesB,
        (false, true) => ParetoCompare::BDominatesA,
        _ => ParetoCompare::Equal,
    }
}

/// Front index of every point; front 0 is non-dominated.
///
/// # Complexity
///
/// O(F · n²) for F fronts.
pub fn pareto_fronts(points: &[(f64, f64)]) -> Vec<usize> {
    let n = points.len();
    let mut front = vec![usize::MAX; n];
    let mut assigned = 0;
    let mut level = 0;
    while assigned < n {
        let current: Vec<usize> = (0..n)
            .filter(|&i| front[i] == usize::MAX)
            .filter(|&i| {
                !(0..n).any(|j| {
                    front[j] == usize::MAX
                        && pareto_compare(points[j], points[i]) == ParetoCompare::ADominatesB
                })
            })
            .collect();
        for &i in &current {
            front[i] = level;
        }
        assigned += current.len();
        level += 1;
    }
    front
}

/// Indices of `points` from best to worst: by front, then objective, then
/// index.
///
/// # Examples
///
/// ```
/// use u_evrp::dema::pareto_order;
///
/// // (objective, overlap)
/// let points = [(10.0, 0.9), (12.0, 0.1), (11.0, 0.95), (9.0, 0.5)];
/// // 3 and 1 are non-dominated, 0 is dominated by 3, 2 by 0
/// assert_eq!(pareto_order(&points), vec![3, 1, 0, 2]);
/// ```
pub fn pareto_order(points: &[(f64, f64)]) -> Vec<usize> {
    let fronts = pareto_fronts(points);
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        fronts[a]
            .cmp(&fronts[b])
            .then(points[a].0.total_cmp(&points[b].0))
            .then(a.cmp(&b))
    });
    order
}

/// Picks two random positions of a best-first ranking of `len` members and
/// returns the better-ranked one.
///
/// # Panics
///
/// Panics if `len` is zero.
pub fn binary_tournament<R: Rng + ?Sized>(len: usize, rng: &mut R) -> usize {
    assert!(len > 0, "tournament over an empty population");
    let a = rng.random_range(0..len);
    let b = rng.random_range(0..len);
    a.min(b)
}
