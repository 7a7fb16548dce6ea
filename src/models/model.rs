//! EVRP problem instance.

use serde::{Deserialize, Serialize};

use super::{Node, NodeKind, Vehicle};
use crate::distance::DistanceMatrix;
use crate::error::{EvrpError, Result};

/// Axis-aligned bounding box of all node coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

/// An EVRP instance: one depot, customers, charging stations and a
/// homogeneous fleet.
///
/// Node ids are assigned on construction: the depot is `0`, customers are
/// `1..=n` in the given order and rechargers follow. Distances and each
/// node's ranking of charging stations are precomputed.
///
/// # Examples
///
/// ```
/// use u_evrp::models::{Model, Node, Vehicle};
///
/// let model = Model::new(
///     Node::depot(0.0, 0.0),
///     vec![Node::customer(3.0, 4.0, 10.0, 0.0), Node::customer(-3.0, 4.0, 10.0, 0.0)],
///     vec![Node::recharger(0.0, 4.0)],
///     Vehicle::new(100.0, 50.0, 1.0),
///     2,
/// )
/// .unwrap();
///
/// assert_eq!(model.customers(), &[1, 2]);
/// assert_eq!(model.rechargers(), &[3]);
/// assert!((model.distance(0, 1) - 5.0).abs() < 1e-10);
/// assert_eq!(model.nearest_stations(1)[0], 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    nodes: Vec<Node>,
    customers: Vec<usize>,
    rechargers: Vec<usize>,
    vehicle: Vehicle,
    max_vehicles: usize,
    distances: DistanceMatrix,
    nearest_stations: Vec<Vec<usize>>,
}

impl Model {
    /// Id of the depot in every model.
    pub const DEPOT: usize = 0;

    /// Builds a model, assigning node ids and precomputing distances.
    ///
    /// # Errors
    ///
    /// Returns [`EvrpError::InvalidModel`] if a node has the wrong kind for
    /// its slot, there are no customers, the fleet is empty, or the vehicle
    /// parameters are not positive.
    pub fn new(
        depot: Node,
        customers: Vec<Node>,
        rechargers: Vec<Node>,
        vehicle: Vehicle,
        max_vehicles: usize,
    ) -> Result<Self> {
        if depot.kind() != NodeKind::Depot {
            return Err(EvrpError::InvalidModel("first node must be a depot".into()));
        }
        if customers.is_empty() {
            return Err(EvrpError::InvalidModel("at least one customer is required".into()));
        }
        if let Some(n) = customers.iter().find(|n| n.kind() != NodeKind::Customer) {
            return Err(EvrpError::InvalidModel(format!(
                "customer list contains a {:?}",
                n.kind()
            )));
        }
        if let Some(n) = rechargers.iter().find(|n| n.kind() != NodeKind::Recharger) {
            return Err(EvrpError::InvalidModel(format!(
                "recharger list contains a {:?}",
                n.kind()
            )));
        }
        if max_vehicles == 0 {
            return Err(EvrpError::InvalidModel("max_vehicles must be positive".into()));
        }
        if !(vehicle.capacity() > 0.0 && vehicle.max_battery() > 0.0) {
            return Err(EvrpError::InvalidModel(
                "vehicle capacity and battery must be positive".into(),
            ));
        }
        if vehicle.battery_cost_speed() < 0.0 || vehicle.charging_rate() < 0.0 {
            return Err(EvrpError::InvalidModel(
                "battery consumption and charging rate must be non-negative".into(),
            ));
        }

        let num_customers = customers.len();
        let mut nodes = Vec::with_capacity(1 + num_customers + rechargers.len());
        nodes.push(depot);
        nodes.extend(customers);
        nodes.extend(rechargers);
        for (id, node) in nodes.iter_mut().enumerate() {
            node.set_id(id);
        }

        let customers: Vec<usize> = (1..=num_customers).collect();
        let rechargers: Vec<usize> = (num_customers + 1..nodes.len()).collect();
        let distances = DistanceMatrix::from_nodes(&nodes);
        let nearest_stations = (0..nodes.len())
            .map(|id| distances.ranked_by_distance(id, &rechargers))
            .collect();

        Ok(Self {
            nodes,
            customers,
            rechargers,
            vehicle,
            max_vehicles,
            distances,
            nearest_stations,
        })
    }

    /// All nodes, indexed by id.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a node of this model.
    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    /// The depot node.
    pub fn depot(&self) -> &Node {
        &self.nodes[Self::DEPOT]
    }

    /// Customer ids.
    pub fn customers(&self) -> &[usize] {
        &self.customers
    }

    /// Recharger ids.
    pub fn rechargers(&self) -> &[usize] {
        &self.rechargers
    }

    /// Number of customers.
    pub fn num_customers(&self) -> usize {
        self.customers.len()
    }

    /// The fleet's vehicle type.
    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    /// Fleet size.
    pub fn max_vehicles(&self) -> usize {
        self.max_vehicles
    }

    /// Travel distance (and travel time) between two nodes.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances.get(from, to)
    }

    /// Rechargers ordered by distance from `node`, nearest first.
    pub fn nearest_stations(&self, node: usize) -> &[usize] {
        &self.nearest_stations[node]
    }

    /// Bounding box of all node coordinates.
    pub fn map_bounds(&self) -> MapBounds {
        let mut bounds = MapBounds {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        };
        for node in &self.nodes {
            bounds.min_x = bounds.min_x.min(node.x());
            bounds.max_x = bounds.max_x.max(node.x());
            bounds.min_y = bounds.min_y.min(node.y());
            bounds.max_y = bounds.max_y.max(node.y());
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Model {
        Model::new(
            Node::depot(0.0, 0.0),
            vec![
                Node::customer(10.0, 0.0, 5.0, 0.0),
                Node::customer(0.0, 10.0, 5.0, 0.0),
            ],
            vec![Node::recharger(9.0, 0.0), Node::recharger(0.0, 2.0)],
            Vehicle::new(50.0, 100.0, 1.0),
            3,
        )
        .expect("valid model")
    }

    #[test]
    fn test_ids_assigned() {
        let m = sample();
        assert_eq!(m.nodes().len(), 5);
        for (i, n) in m.nodes().iter().enumerate() {
            assert_eq!(n.id(), i);
        }
        assert!(m.depot().is_depot());
        assert_eq!(m.customers(), &[1, 2]);
        assert_eq!(m.rechargers(), &[3, 4]);
        assert_eq!(m.num_customers(), 2);
    }

    #[test]
    fn test_nearest_stations() {
        let m = sample();
        assert_eq!(m.nearest_stations(1), &[3, 4]);
        assert_eq!(m.nearest_stations(0), &[4, 3]);
        assert_eq!(m.nearest_stations(2), &[4, 3]);
    }

    #[test]
    fn test_map_bounds() {
        let b = sample().map_bounds();
        assert_eq!(b.min_x, 0.0);
        assert_eq!(b.max_x, 10.0);
        assert_eq!(b.max_y, 10.0);
    }

    #[test]
    fn test_rejects_wrong_kinds() {
        let err = Model::new(
            Node::depot(0.0, 0.0),
            vec![Node::recharger(1.0, 1.0)],
            vec![],
            Vehicle::new(10.0, 10.0, 1.0),
            1,
        );
        assert!(matches!(err, Err(EvrpError::InvalidModel(_))));
    }

    #[test]
    fn test_rejects_empty_fleet() {
        let err = Model::new(
            Node::depot(0.0, 0.0),
            vec![Node::customer(1.0, 1.0, 1.0, 0.0)],
            vec![],
            Vehicle::new(10.0, 10.0, 1.0),
            0,
        );
        assert!(err.is_err());
    }
}
