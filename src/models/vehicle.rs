//! Electric vehicle type with cargo and battery limits.

use serde::{Deserialize, Serialize};

/// The (homogeneous) vehicle that services every route.
///
/// # Examples
///
/// ```
/// use u_evrp::models::Vehicle;
///
/// let v = Vehicle::new(200.0, 79.69, 1.0).with_charging_rate(3.39);
/// assert_eq!(v.capacity(), 200.0);
/// assert_eq!(v.max_battery(), 79.69);
/// assert_eq!(v.charging_rate(), 3.39);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    capacity: f64,
    max_battery: f64,
    battery_cost_speed: f64,
    charging_rate: f64,
}

impl Vehicle {
    /// Creates a vehicle with the given cargo capacity, battery capacity and
    /// energy consumption per unit distance.
    ///
    /// Recharging is instantaneous until [`with_charging_rate`](Self::with_charging_rate)
    /// says otherwise.
    pub fn new(capacity: f64, max_battery: f64, battery_cost_speed: f64) -> Self {
        Self {
            capacity,
            max_battery,
            battery_cost_speed,
            charging_rate: 0.0,
        }
    }

    /// Sets the time needed to recharge one unit of energy.
    pub fn with_charging_rate(mut self, rate: f64) -> Self {
        self.charging_rate = rate;
        self
    }

    /// Maximum load capacity.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Battery capacity.
    pub fn max_battery(&self) -> f64 {
        self.max_battery
    }

    /// Energy consumed per unit distance.
    pub fn battery_cost_speed(&self) -> f64 {
        self.battery_cost_speed
    }

    /// Time per unit of energy recharged at a station.
    pub fn charging_rate(&self) -> f64 {
        self.charging_rate
    }

    /// Energy needed to drive `distance`.
    pub fn energy_for(&self, distance: f64) -> f64 {
        self.battery_cost_speed * distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_new() {
        let v = Vehicle::new(100.0, 50.0, 2.0);
        assert_eq!(v.capacity(), 100.0);
        assert_eq!(v.max_battery(), 50.0);
        assert_eq!(v.battery_cost_speed(), 2.0);
        assert_eq!(v.charging_rate(), 0.0);
    }

    #[test]
    fn test_energy_for() {
        let v = Vehicle::new(100.0, 50.0, 0.5);
        assert!((v.energy_for(10.0) - 5.0).abs() < 1e-10);
    }
}
