//! Station-in-route relocation: move a recharger visit inside its route.

use rand::Rng;

use super::{inner_slots, predecessor_slots, relocate, successor_slots, MoveSignature, Neighbor};
use crate::models::{Model, Solution};

/// Moves the recharger at index `from` of `route` in front of the visit
/// currently at index `to` of the same route.
pub fn move_station(solution: &Solution, route: usize, from: usize, to: usize) -> Solution {
    relocate(solution, route, from, route, to)
}

/// Moves a random recharger visit to a random other slot of its route.
///
/// Returns an unchanged copy when no recharger can move.
pub fn station_in_route_random<R: Rng + ?Sized>(
    solution: &Solution,
    model: &Model,
    rng: &mut R,
) -> Solution {
    let movable: Vec<(usize, usize)> = solution
        .routes()
        .iter()
        .enumerate()
        .filter(|(_, r)| r.len() >= 4)
        .flat_map(|(i, r)| {
            r.recharger_positions(model)
                .into_iter()
                .map(move |k| (i, k))
        })
        .collect();
    if movable.is_empty() {
        return solution.clone();
    }
    let (route, from) = movable[rng.random_range(0..movable.len())];
    let len = solution.routes()[route].len();
    let mut to = rng.random_range(1..len - 2);
    if to >= from {
        to += 2;
    }
    move_station(solution, route, from, to)
}

/// Station moves that make `b` directly follow `a` inside one route: a
/// recharger `b` moved behind `a`, or a recharger `a` moved in front of `b`.
pub fn station_moves(solution: &Solution, model: &Model, a: usize, b: usize) -> Vec<Neighbor> {
    let mut out = Vec::new();

    if model.node(b).is_recharger() {
        for (j, q) in inner_slots(solution, b) {
            for (i, p) in predecessor_slots(solution, model, a) {
                let to = p + 1;
                if i != j || to == q {
                    continue;
                }
                out.push(Neighbor {
                    solution: move_station(solution, j, q, to),
                    signature: MoveSignature::StationInRoute {
                        station: b,
                        route: j,
                        pos: to,
                    },
                });
            }
        }
    }

    if model.node(a).is_recharger() {
        for (i, p) in inner_slots(solution, a) {
            for (j, q) in successor_slots(solution, model, b) {
                if i != j || q == 0 || q == p + 1 {
                    continue;
                }
                out.push(Neighbor {
                    solution: move_station(solution, i, p, q),
                    signature: MoveSignature::StationInRoute {
                        station: a,
                        route: i,
                        pos: q,
                    },
                });
            }
        }
    }
    out
}
