//! Cumulative load, time and battery state along a route.

use crate::models::{Model, NodeKind, RouteProfile};

/// Walks `visits` and records load, arrival time and remaining battery at
/// every index.
///
/// - Load leaves the depot as the sum of all deliveries and drops by each
///   node's demand (pickups have negative demand and raise it).
/// - Service starts at `max(arrival, ready)`; at a recharger the vehicle also
///   waits `(max_battery - battery) * charging_rate` to refill.
/// - The battery drains `battery_cost_speed` per unit distance and is full
///   again when leaving a recharger or the depot.
///
/// # Examples
///
/// ```
/// use u_evrp::models::{Model, Node, Vehicle};
/// use u_evrp::evaluation::compute_profile;
///
/// let model = Model::new(
///     Node::depot(0.0, 0.0),
///     vec![Node::customer(3.0, 4.0, 10.0, 2.0)],
///     vec![],
///     Vehicle::new(100.0, 50.0, 1.0),
///     1,
/// )
/// .unwrap();
///
/// let p = compute_profile(&model, &[0, 1, 0]);
/// assert_eq!(p.loads, vec![10.0, 0.0, 0.0]);
/// assert_eq!(p.arrivals, vec![0.0, 5.0, 12.0]);
/// assert_eq!(p.batteries, vec![50.0, 45.0, 40.0]);
/// assert!((p.distance - 10.0).abs() < 1e-10);
/// ```
pub fn compute_profile(model: &Model, visits: &[usize]) -> RouteProfile {
    let vehicle = model.vehicle();
    let n = visits.len();
    let mut loads = Vec::with_capacity(n);
    let mut arrivals = Vec::with_capacity(n);
    let mut batteries = Vec::with_capacity(n);
    let mut distance = 0.0;

    let Some(&first) = visits.first() else {
        return RouteProfile::default();
    };

    let deliveries: f64 = visits
        .iter()
        .map(|&v| model.node(v).demand())
        .filter(|&d| d > 0.0)
        .sum();
    let start = model.node(first);
    let mut load = deliveries;
    let mut departure = start.ready_time() + start.service_time();
    let mut battery = vehicle.max_battery();
    loads.push(load);
    arrivals.push(start.ready_time());
    batteries.push(battery);

    for pair in visits.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        let node = model.node(cur);
        let travel = model.distance(prev, cur);
        distance += travel;

        let arrival = departure + travel;
        let arrive_battery = battery - vehicle.energy_for(travel);
        load -= node.demand();

        let mut service_start = arrival + node.time_window().waiting_time(arrival);
        battery = match node.kind() {
            NodeKind::Customer => arrive_battery,
            NodeKind::Recharger => {
                service_start += (vehicle.max_battery() - arrive_battery).max(0.0)
                    * vehicle.charging_rate();
                vehicle.max_battery()
            }
            NodeKind::Depot => vehicle.max_battery(),
        };
        departure = service_start + node.service_time();

        loads.push(load);
        arrivals.push(arrival);
        batteries.push(arrive_battery);
    }

    RouteProfile {
        loads,
        arrivals,
        batteries,
        distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Node, TimeWindow, Vehicle};

    fn model(charging_rate: f64) -> Model {
        Model::new(
            Node::depot(0.0, 0.0),
            vec![
                Node::customer(4.0, 0.0, 10.0, 1.0)
                    .with_time_window(TimeWindow::new(6.0, 50.0).expect("valid")),
                Node::customer(8.0, 0.0, -5.0, 1.0),
            ],
            vec![Node::recharger(6.0, 0.0)],
            Vehicle::new(100.0, 10.0, 1.0).with_charging_rate(charging_rate),
            1,
        )
        .expect("valid model")
    }

    #[test]
    fn test_pickup_raises_load() {
        let m = model(0.0);
        let p = compute_profile(&m, &[0, 1, 2, 0]);
        assert_eq!(p.loads, vec![10.0, 0.0, 5.0, 5.0]);
    }

    #[test]
    fn test_waiting_for_ready_time() {
        let m = model(0.0);
        let p = compute_profile(&m, &[0, 1, 2, 0]);
        // arrive at 4, wait to 6, serve 1, drive 4
        assert_eq!(p.arrivals, vec![0.0, 4.0, 11.0, 20.0]);
    }

    #[test]
    fn test_battery_without_station() {
        let m = model(0.0);
        let p = compute_profile(&m, &[0, 1, 2, 0]);
        assert_eq!(p.batteries, vec![10.0, 6.0, 2.0, -6.0]);
    }

    #[test]
    fn test_station_refills_and_costs_time() {
        let m = model(0.5);
        let p = compute_profile(&m, &[0, 1, 3, 2, 0]);
        // reach station with 4 left, recharge 6 units at 0.5 = 3 time units
        assert_eq!(p.batteries, vec![10.0, 6.0, 4.0, 8.0, 0.0]);
        assert_eq!(p.arrivals, vec![0.0, 4.0, 9.0, 14.0, 23.0]);
        assert!((p.distance - 16.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_visit_list() {
        let m = model(0.0);
        assert_eq!(compute_profile(&m, &[]), RouteProfile::default());
    }
}
