//! Cyclic segment exchange, the VNS shaking move.
//!
//! # Algorithm
//!
//! Picks `min(R, routes)` routes, cuts a random inner segment of length at
//! most `m` from each, then gives route `k` the segment cut from route
//! `k + 1` (the last route receives the first segment). Segments may be
//! empty, so a route can gain or lose visits.

use rand::seq::index;
use rand::Rng;

use super::drop_emptied;
use crate::models::{Route, Solution};

/// Shakes `solution` by rotating random segments among up to `num_routes`
/// routes.
///
/// # Examples
///
/// ```
/// use u_evrp::models::{Route, Solution};
/// use u_evrp::neighborhood::cyclic_exchange;
/// use u_evrp::random::create_rng;
///
/// let sol = Solution::new(vec![
///     Route::from_visits(vec![0, 1, 2, 0]),
///     Route::from_visits(vec![0, 3, 4, 0]),
/// ]);
/// let mut rng = create_rng(11);
/// let shaken = cyclic_exchange(&sol, 2, 2, &mut rng);
///
/// let mut served: Vec<usize> = shaken.routes().iter().flat_map(|r| r.inner().to_vec()).collect();
/// served.sort_unstable();
/// assert_eq!(served, vec![1, 2, 3, 4]);
/// ```
pub fn cyclic_exchange<R: Rng + ?Sized>(
    solution: &Solution,
    num_routes: usize,
    max_segment: usize,
    rng: &mut R,
) -> Solution {
    let total = solution.num_routes();
    if total == 0 {
        return solution.clone();
    }
    let selected: Vec<usize> = if total <= num_routes {
        (0..total).collect()
    } else {
        index::sample(rng, total, num_routes).into_vec()
    };

    let segments: Vec<_> = selected
        .iter()
        .map(|&i| solution.routes()[i].random_segment(rng, max_segment))
        .collect();

    let mut result = solution.clone();
    let routes = result.routes_mut();
    for k in 0..selected.len() {
        let next = (k + 1) % selected.len();
        let donor = &solution.routes()[selected[next]].visits()[segments[next].clone()];
        let receiver = solution.routes()[selected[k]].visits();
        let seg = &segments[k];

        let mut visits = Vec::with_capacity(receiver.len() + donor.len());
        visits.extend_from_slice(&receiver[..seg.start]);
        visits.extend_from_slice(donor);
        visits.extend_from_slice(&receiver[seg.end..]);
        routes[selected[k]] = Route::from_visits(visits);
    }
    drop_emptied(routes, &selected);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn served(sol: &Solution) -> Vec<usize> {
        let mut v: Vec<usize> = sol.routes().iter().flat_map(|r| r.inner().to_vec()).collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_preserves_visits_and_input() {
        let sol = Solution::new(vec![
            Route::from_visits(vec![0, 1, 2, 3, 0]),
            Route::from_visits(vec![0, 4, 5, 0]),
            Route::from_visits(vec![0, 6, 0]),
            Route::from_visits(vec![0, 7, 8, 0]),
        ]);
        let before = sol.clone();
        let mut rng = create_rng(5);
        for _ in 0..100 {
            let s = cyclic_exchange(&sol, 3, 2, &mut rng);
            assert_eq!(served(&s), (1..=8).collect::<Vec<_>>());
            for r in s.routes() {
                assert!(!r.is_empty());
                assert_eq!(r.visits()[0], 0);
                assert_eq!(*r.visits().last().expect("non-empty"), 0);
            }
        }
        assert_eq!(sol, before);
    }

    #[test]
    fn test_single_route_unchanged() {
        let sol = Solution::new(vec![Route::from_visits(vec![0, 1, 2, 0])]);
        let mut rng = create_rng(1);
        let s = cyclic_exchange(&sol, 4, 3, &mut rng);
        assert_eq!(s, sol);
    }

    #[test]
    fn test_empty_route_can_receive() {
        let sol = Solution::new(vec![Route::from_visits(vec![0, 1, 2, 3, 0]), Route::new(0)]);
        let mut rng = create_rng(9);
        let grew = (0..200).any(|_| {
            let s = cyclic_exchange(&sol, 2, 3, &mut rng);
            s.num_routes() == 2 && s.routes().iter().all(|r| !r.is_empty())
        });
        assert!(grew);
    }
}
