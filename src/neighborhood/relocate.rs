//! Relocate: move a single visit to another slot.

use rand::Rng;

use super::{drop_emptied, inner_slots, predecessor_slots, successor_slots, MoveSignature, Neighbor};
use crate::models::{Model, Solution};

/// Moves the visit at index `from_pos` of route `from_route` so that it sits
/// in front of the visit currently at index `to_pos` of route `to_route`.
///
/// Within one route `to_pos` must differ from `from_pos` and
/// `from_pos + 1` (both leave the route unchanged). A source route left
/// empty is dropped.
///
/// # Examples
///
/// ```
/// use u_evrp::models::{Route, Solution};
/// use u_evrp::neighborhood::relocate;
///
/// let sol = Solution::new(vec![
///     Route::from_visits(vec![0, 1, 2, 0]),
///     Route::from_visits(vec![0, 3, 0]),
/// ]);
/// let s = relocate(&sol, 0, 1, 1, 2);
/// assert_eq!(s.routes()[0].visits(), &[0, 2, 0]);
/// assert_eq!(s.routes()[1].visits(), &[0, 3, 1, 0]);
/// ```
pub fn relocate(
    solution: &Solution,
    from_route: usize,
    from_pos: usize,
    to_route: usize,
    to_pos: usize,
) -> Solution {
    let mut result = solution.clone();
    let routes = result.routes_mut();
    if from_route == to_route {
        debug_assert!(to_pos != from_pos && to_pos != from_pos + 1);
        let route = &mut routes[from_route];
        let node = route.visits()[from_pos];
        route.insert(to_pos, node);
        let stale = if to_pos > from_pos { from_pos } else { from_pos + 1 };
        route.remove(stale);
    } else {
        let node = routes[from_route].remove(from_pos);
        routes[to_route].insert(to_pos, node);
        drop_emptied(routes, &[from_route]);
    }
    result
}

/// Moves the visit at index `pos` of route `route` to a random slot.
///
/// The target route is drawn among all routes when the source holds at
/// least two inner visits and among the other routes otherwise. Returns an
/// unchanged copy when no other slot exists.
pub fn relocate_random<R: Rng + ?Sized>(
    solution: &Solution,
    route: usize,
    pos: usize,
    rng: &mut R,
) -> Solution {
    let total = solution.num_routes();
    let len = solution.routes()[route].len();
    let target = if len > 3 {
        rng.random_range(0..total)
    } else {
        if total < 2 {
            return solution.clone();
        }
        let t = rng.random_range(0..total - 1);
        if t >= route {
            t + 1
        } else {
            t
        }
    };

    if target != route {
        let to_pos = rng.random_range(1..solution.routes()[target].len());
        return relocate(solution, route, pos, target, to_pos);
    }
    // 1..len without pos and pos + 1
    let mut to_pos = rng.random_range(1..len - 2);
    if to_pos >= pos {
        to_pos += 2;
    }
    relocate(solution, route, pos, route, to_pos)
}

/// Relocations that make `b` directly follow `a`: `b` moved behind `a`, or
/// `a` moved in front of `b`.
pub fn relocate_moves(solution: &Solution, model: &Model, a: usize, b: usize) -> Vec<Neighbor> {
    let mut out = Vec::new();

    for (j, q) in inner_slots(solution, b) {
        for (i, p) in predecessor_slots(solution, model, a) {
            let to_pos = p + 1;
            if to_pos >= solution.routes()[i].len() || (i == j && to_pos == q) {
                continue;
            }
            out.push(Neighbor {
                solution: relocate(solution, j, q, i, to_pos),
                signature: MoveSignature::Relocate {
                    node: b,
                    route: i,
                    pos: to_pos,
                },
            });
        }
    }

    for (i, p) in inner_slots(solution, a) {
        for (j, q) in successor_slots(solution, model, b) {
            if q == 0 || (i == j && q == p + 1) {
                continue;
            }
            out.push(Neighbor {
                solution: relocate(solution, i, p, j, q),
                signature: MoveSignature::Relocate {
                    node: a,
                    route: j,
                    pos: q,
                },
            });
        }
    }
    out
}
