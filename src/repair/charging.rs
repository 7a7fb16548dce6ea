//! Charging-station insertion for battery-infeasible routes.
//!
//! # Algorithm
//!
//! For a route that holds capacity and time windows but runs its battery
//! below zero:
//!
//! 1. `left_fail` is the first visit reached with a negative battery. A
//!    station must be inserted after the last recharger before it and no
//!    later than in front of it.
//! 2. If the route also ends below zero, `right_fail` is the last visit
//!    whose battery, lifted by the final deficit, would exceed the vehicle's
//!    capacity. A second station after it lets the vehicle reach the depot.
//! 3. Each insertion slot is paired with the unused station nearest to the
//!    visit at that slot. Slots valid for both windows are tried alone
//!    first; failing that, one station is placed on each side, trying
//!    left/right combinations before settling for the last left slot and
//!    the first right slot.
//!
//! A station already visited anywhere in the solution is never inserted
//! again.

use crate::models::{Model, Route, Solution};

/// Inserts unused charging stations into battery-infeasible routes.
///
/// Returns `true` if any route changed. With no unused station left the
/// solution is untouched and `false` is returned.
///
/// # Examples
///
/// ```
/// use u_evrp::models::{Model, Node, Route, Solution, Vehicle};
/// use u_evrp::repair::repair_charging;
///
/// let model = Model::new(
///     Node::depot(0.0, 0.0),
///     vec![Node::customer(10.0, 0.0, 1.0, 0.0)],
///     vec![Node::recharger(10.0, 1.0)],
///     Vehicle::new(10.0, 15.0, 1.0),
///     1,
/// )
/// .unwrap();
///
/// let mut sol = Solution::new(vec![Route::from_visits(vec![0, 1, 0])]);
/// assert!(!sol.is_battery_feasible(&model));
/// assert!(repair_charging(&mut sol, &model));
/// assert!(sol.is_battery_feasible(&model));
/// ```
pub fn repair_charging(solution: &mut Solution, model: &Model) -> bool {
    let used = solution.used_stations(model);
    let mut unused: Vec<usize> = model
        .rechargers()
        .iter()
        .copied()
        .filter(|s| !used.contains(s))
        .collect();
    if unused.is_empty() {
        return false;
    }

    let mut modified = false;
    for r in 0..solution.num_routes() {
        if unused.is_empty() {
            break;
        }
        let route = &solution.routes()[r];
        if !route.is_capacity_feasible(model)
            || !route.is_time_feasible(model)
            || route.is_battery_feasible(model)
        {
            continue;
        }
        if let Some(visits) = repair_route(route, model, &mut unused) {
            solution.routes_mut()[r] = Route::from_visits(visits);
            modified = true;
        }
    }
    modified
}

/// Candidate insertion: visit index and the station to put in front of it.
type Slot = (usize, usize);

fn repair_route(route: &Route, model: &Model, unused: &mut Vec<usize>) -> Option<Vec<usize>> {
    let visits = route.visits();
    let batteries = &route.profile(model).batteries;
    let n = visits.len();
    let max_battery = model.vehicle().max_battery();

    let left_fail = batteries.iter().position(|&b| b < 0.0)?;
    let last = batteries[n - 1];
    let right_fail = if last < 0.0 {
        (0..n)
            .rev()
            .find(|&i| batteries[i] - last > max_battery)
            .unwrap_or(0)
    } else {
        n
    };
    let anchor = route
        .recharger_positions(model)
        .into_iter()
        .filter(|&k| k < left_fail)
        .last()
        .unwrap_or(0);

    let left: Vec<usize> = (anchor + 1..=left_fail).collect();
    let right: Vec<usize> = (right_fail + 1..n).collect();
    let common: Vec<usize> = left.iter().copied().filter(|k| right.contains(k)).collect();

    let nearest = |k: usize, unused: &[usize], except: Option<usize>| -> Option<Slot> {
        model
            .nearest_stations(visits[k])
            .iter()
            .copied()
            .find(|s| unused.contains(s) && Some(*s) != except)
            .map(|s| (k, s))
    };

    let slots = |positions: &[usize], unused: &[usize]| -> Vec<Slot> {
        positions
            .iter()
            .filter_map(|&k| nearest(k, unused, None))
            .collect()
    };
    let first_feasible = |candidates: &[Slot]| -> Option<Slot> {
        candidates
            .iter()
            .copied()
            .find(|&slot| battery_feasible(model, &with_stations(visits, &[slot])))
    };

    let common_slots = slots(&common, unused);
    let common_hit = first_feasible(&common_slots);
    let chosen: Vec<Slot> = if let Some(slot) = common_hit {
        vec![slot]
    } else if !right.is_empty() && unused.len() > 1 {
        let lefts = slots(&left, unused);
        let paired = lefts.iter().find_map(|&l| {
            right
                .iter()
                .filter_map(|&k| nearest(k, unused, Some(l.1)))
                .map(|rs| [l, rs])
                .find(|pair| battery_feasible(model, &with_stations(visits, pair)))
        });
        match paired {
            Some(pair) => pair.to_vec(),
            None => {
                let l = *lefts.last()?;
                let mut fallback = vec![l];
                fallback.extend(right.first().and_then(|&k| nearest(k, unused, Some(l.1))));
                fallback
            }
        }
    } else {
        let candidates = if common_slots.is_empty() {
            slots(&left, unused)
        } else {
            common_slots
        };
        vec![first_feasible(&candidates).or_else(|| candidates.last().copied())?]
    };

    for &(_, s) in &chosen {
        unused.retain(|&u| u != s);
    }
    Some(with_stations(visits, &chosen))
}

/// Copy of `visits` with each station placed in front of its slot's visit.
fn with_stations(visits: &[usize], slots: &[Slot]) -> Vec<usize> {
    let mut sorted = slots.to_vec();
    sorted.sort_by(|a, b| b.0.cmp(&a.0));
    let mut out = visits.to_vec();
    for (k, s) in sorted {
        out.insert(k, s);
    }
    out
}

fn battery_feasible(model: &Model, visits: &[usize]) -> bool {
    Route::from_visits(visits.to_vec()).is_battery_feasible(model)
}
