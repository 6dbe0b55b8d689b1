//! Single-lane highway with cars and traffic lights.
//!
//! Unlike the ocean, the highway is double-buffered: every tick builds a
//! fresh [`Road`] from the frozen previous one and swaps it in at the end,
//! so each car's distance to the next obstacle is measured against the
//! pre-tick world.

use crate::choice::chance;
use crate::config::HighwayConfig;
use crate::error::{ensure_positive, ensure_probability, ensure_velocity, SimError};
use crate::grid::ToroidalGrid;
use crate::stats::TrafficStats;
use crate::traffic::{accelerate, linger, MAX_VELOCITY};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::fmt;

/// A car on the vehicle plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Car {
    pub velocity: u32,
}

/// A traffic light on the signal plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficLight {
    pub is_green: bool,
    /// Ticks left before a red light turns green
    pub remaining_red: u32,
}

impl Default for TrafficLight {
    fn default() -> Self {
        Self {
            is_green: true,
            remaining_red: 0,
        }
    }
}

impl TrafficLight {
    /// A red light blocks cars.
    #[inline]
    pub fn is_solid(&self) -> bool {
        !self.is_green
    }
}

/// What to put at a road position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadFeature {
    Car { velocity: u32 },
    TrafficLight,
}

/// One buffer of the highway: a vehicle plane and a signal plane sharing
/// position indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Road {
    cars: ToroidalGrid<Car>,
    lights: ToroidalGrid<TrafficLight>,
}

impl Road {
    fn new(length: usize) -> Result<Self, SimError> {
        Ok(Self {
            cars: ToroidalGrid::new(length, 1)?,
            lights: ToroidalGrid::new(length, 1)?,
        })
    }

    /// An empty buffer of the same length.
    fn blank(&self) -> Self {
        Self {
            cars: self.cars.blank(),
            lights: self.lights.blank(),
        }
    }

    pub fn length(&self) -> usize {
        self.cars.width()
    }

    pub fn car(&self, pos: i64) -> Option<&Car> {
        self.cars.get(pos, 0)
    }

    pub fn light(&self, pos: i64) -> Option<&TrafficLight> {
        self.lights.get(pos, 0)
    }

    /// A position is solid if a car or a red light occupies it.
    pub fn is_solid(&self, pos: i64) -> bool {
        self.car(pos).is_some() || self.light(pos).is_some_and(TrafficLight::is_solid)
    }

    /// Free cells ahead of `pos` before the first solid one, at most the
    /// road length.
    pub fn distance_to_next_obstacle(&self, pos: i64) -> u32 {
        let length = self.length() as i64;
        (0..length)
            .find(|&p| self.is_solid(pos + 1 + p))
            .unwrap_or(length) as u32
    }
}

/// The single-lane traffic automaton
pub struct Highway {
    road: Road,

    // State
    generation: u64,
    stats: TrafficStats,

    // Parameters
    car_linger: f64,
    red_probability: f64,
    red_duration: u32,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,
}

impl Highway {
    /// Create an empty highway with a random seed
    pub fn new(config: &HighwayConfig) -> Result<Self, SimError> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create an empty highway with a specific seed for reproducibility
    pub fn new_with_seed(config: &HighwayConfig, seed: u64) -> Result<Self, SimError> {
        config.validate()?;

        log::debug!(
            "Highway created: length={}, linger={}, red_probability={}, red_duration={}, seed={}",
            config.length,
            config.car_linger,
            config.red_probability,
            config.red_duration,
            seed
        );

        Ok(Self {
            road: Road::new(config.length)?,
            generation: 0,
            stats: TrafficStats::new(),
            car_linger: config.car_linger,
            red_probability: config.red_probability,
            red_duration: config.red_duration,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        })
    }

    /// Advance one generation
    pub fn step(&mut self) {
        let length = self.road.length() as i64;
        let mut next = self.road.blank();

        for pos in 0..length {
            if let Some(car) = self.road.car(pos).copied() {
                let distance = self.road.distance_to_next_obstacle(pos);
                let moved = self.update_car(car, distance);
                let previous = next.cars.set(pos + moved.velocity as i64, 0, Some(moved));
                debug_assert!(previous.is_none(), "two cars moved into one cell");
            }

            if let Some(light) = self.road.light(pos).copied() {
                let light = self.update_light(light);
                next.lights.set(pos, 0, Some(light));
            }
        }

        self.road = next;
        self.generation += 1;
        self.stats.update(
            self.generation,
            self.road.cars.iter().map(|(_, car)| car.velocity),
        );

        log::trace!("{}", self.stats.summary());
    }

    /// Run the highway for the given number of generations
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    fn update_car(&mut self, car: Car, distance: u32) -> Car {
        let mut velocity = accelerate(car.velocity);
        velocity = velocity.min(distance);
        velocity = linger(&mut self.rng, velocity, self.car_linger);
        Car { velocity }
    }

    fn update_light(&mut self, mut light: TrafficLight) -> TrafficLight {
        if light.remaining_red > 0 {
            light.remaining_red -= 1;
        }
        if light.remaining_red == 0 {
            light.is_green = true;
        }
        if light.is_green && chance(&mut self.rng, self.red_probability) {
            light.is_green = false;
            light.remaining_red = self.red_duration;
        }
        light
    }

    /// Overwrite a position. `None` clears both the car and the light.
    pub fn place(&mut self, pos: i64, feature: Option<RoadFeature>) -> Result<(), SimError> {
        match feature {
            Some(RoadFeature::Car { velocity }) => {
                let velocity = ensure_velocity(velocity, MAX_VELOCITY)?;
                self.road.cars.set(pos, 0, Some(Car { velocity }));
            }
            Some(RoadFeature::TrafficLight) => {
                self.road.lights.set(pos, 0, Some(TrafficLight::default()));
            }
            None => {
                self.road.cars.set(pos, 0, None);
                self.road.lights.set(pos, 0, None);
            }
        }
        Ok(())
    }

    /// Advance a car's velocity by one, wrapping from the maximum back to
    /// zero. Returns the new velocity, or `None` if no car is there.
    pub fn cycle_velocity(&mut self, pos: i64) -> Option<u32> {
        let car = self.road.cars.get_mut(pos, 0)?;
        car.velocity = (car.velocity + 1) % (MAX_VELOCITY + 1);
        Some(car.velocity)
    }

    /// Independently place a standing car and a green light at each
    /// position with the given probabilities.
    pub fn random_fill(&mut self, cars: f64, lights: f64) -> Result<(), SimError> {
        ensure_probability("cars", cars)?;
        ensure_probability("lights", lights)?;

        for pos in 0..self.road.length() as i64 {
            if chance(&mut self.rng, cars) {
                self.road.cars.set(pos, 0, Some(Car { velocity: 0 }));
            }
            if chance(&mut self.rng, lights) {
                self.road.lights.set(pos, 0, Some(TrafficLight::default()));
            }
        }

        self.stats.recount(self.road.cars.occupied());
        log::debug!(
            "Highway filled randomly: cars={}, lights={}",
            self.road.cars.occupied(),
            self.road.lights.occupied()
        );
        Ok(())
    }

    /// Remove every car and light. Generation and parameters are kept.
    pub fn clear(&mut self) {
        self.road.cars.clear();
        self.road.lights.clear();
        self.stats.recount(0);
    }

    pub fn set_car_linger(&mut self, p: f64) -> Result<(), SimError> {
        self.car_linger = ensure_probability("car_linger", p)?;
        log::debug!("Highway car linger set to {}", p);
        Ok(())
    }

    pub fn set_red_probability(&mut self, p: f64) -> Result<(), SimError> {
        self.red_probability = ensure_probability("red_probability", p)?;
        log::debug!("Highway red probability set to {}", p);
        Ok(())
    }

    pub fn set_red_duration(&mut self, ticks: u32) -> Result<(), SimError> {
        self.red_duration = ensure_positive("red_duration", ticks)?;
        log::debug!("Highway red duration set to {}", ticks);
        Ok(())
    }

    pub fn car_linger(&self) -> f64 {
        self.car_linger
    }

    pub fn red_probability(&self) -> f64 {
        self.red_probability
    }

    pub fn red_duration(&self) -> u32 {
        self.red_duration
    }

    /// Current road buffer, read-only
    pub fn road(&self) -> &Road {
        &self.road
    }

    pub fn car(&self, pos: i64) -> Option<&Car> {
        self.road.car(pos)
    }

    pub fn light(&self, pos: i64) -> Option<&TrafficLight> {
        self.road.light(pos)
    }

    /// Cars in ascending position order
    pub fn cars(&self) -> impl Iterator<Item = (usize, &Car)> + '_ {
        self.road.cars.row(0)
    }

    pub fn length(&self) -> usize {
        self.road.length()
    }

    /// Number of completed steps
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn average_velocity(&self) -> f64 {
        self.stats.average_velocity
    }

    pub fn car_count(&self) -> usize {
        self.road.cars.occupied()
    }

    pub fn stats(&self) -> &TrafficStats {
        &self.stats
    }

    /// One-line status from the latest statistics snapshot
    pub fn summary(&self) -> String {
        self.stats.summary()
    }

    /// Get seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl fmt::Display for Highway {
    /// Two lines: car velocities (`.` for empty), then lights (`G`/`R`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pos in 0..self.length() as i64 {
            match self.car(pos) {
                Some(car) => write!(f, "{}", car.velocity)?,
                None => write!(f, ".")?,
            }
        }
        writeln!(f)?;
        for pos in 0..self.length() as i64 {
            match self.light(pos) {
                Some(light) if light.is_green => write!(f, "G")?,
                Some(_) => write!(f, "R")?,
                None => write!(f, " ")?,
            }
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config(length: usize) -> HighwayConfig {
        HighwayConfig {
            length,
            car_linger: 0.0,
            red_probability: 0.0,
            ..HighwayConfig::default()
        }
    }

    fn car(velocity: u32) -> Option<RoadFeature> {
        Some(RoadFeature::Car { velocity })
    }

    #[test]
    fn test_length_validated() {
        assert!(matches!(
            Highway::new_with_seed(&quiet_config(1), 1),
            Err(SimError::InvalidDimension { name: "length", .. })
        ));
        assert!(Highway::new_with_seed(&quiet_config(2), 1).is_ok());
    }

    #[test]
    fn test_distance_to_next_obstacle() {
        let mut highway = Highway::new_with_seed(&quiet_config(10), 1).unwrap();
        highway.place(2, car(0)).unwrap();
        highway.place(6, car(0)).unwrap();

        assert_eq!(highway.road().distance_to_next_obstacle(2), 3);
        // Wraps around to the car at 2
        assert_eq!(highway.road().distance_to_next_obstacle(6), 5);

        // A green light does not block, a red one does
        highway.place(4, Some(RoadFeature::TrafficLight)).unwrap();
        assert_eq!(highway.road().distance_to_next_obstacle(2), 3);
        highway.road.lights.get_mut(4, 0).unwrap().is_green = false;
        assert_eq!(highway.road().distance_to_next_obstacle(2), 1);
    }

    #[test]
    fn test_lone_car_distance_is_capped() {
        let mut highway = Highway::new_with_seed(&quiet_config(4), 1).unwrap();
        highway.place(0, car(0)).unwrap();
        assert_eq!(highway.road().distance_to_next_obstacle(0), 3);

        highway.clear();
        assert_eq!(highway.road().distance_to_next_obstacle(0), 4);
    }

    #[test]
    fn test_car_stops_behind_red_light() {
        let mut config = quiet_config(12);
        config.red_probability = 1.0;
        config.red_duration = 100;
        let mut highway = Highway::new_with_seed(&config, 1).unwrap();
        highway.place(0, car(0)).unwrap();
        highway.place(3, Some(RoadFeature::TrafficLight)).unwrap();

        // Light is green during the first step and turns red at its end
        highway.step();
        assert!(highway.light(3).unwrap().is_solid());

        highway.run(5);
        let (pos, stopped) = highway.cars().next().unwrap();
        assert_eq!(pos, 2);
        assert_eq!(stopped.velocity, 0);
    }

    #[test]
    fn test_light_countdown() {
        let mut config = quiet_config(5);
        config.red_duration = 2;
        let mut highway = Highway::new_with_seed(&config, 1).unwrap();
        highway.place(1, Some(RoadFeature::TrafficLight)).unwrap();
        highway.road.lights.set(
            1,
            0,
            Some(TrafficLight {
                is_green: false,
                remaining_red: 2,
            }),
        );

        highway.step();
        assert_eq!(
            highway.light(1),
            Some(&TrafficLight {
                is_green: false,
                remaining_red: 1
            })
        );

        highway.step();
        assert_eq!(highway.light(1), Some(&TrafficLight::default()));
    }

    #[test]
    fn test_light_turns_green_and_red_in_one_tick() {
        let mut config = quiet_config(5);
        config.red_probability = 1.0;
        config.red_duration = 3;
        let mut highway = Highway::new_with_seed(&config, 1).unwrap();
        highway.road.lights.set(
            1,
            0,
            Some(TrafficLight {
                is_green: false,
                remaining_red: 1,
            }),
        );

        // The countdown expires and the fresh green light is re-rolled red
        highway.step();
        assert_eq!(
            highway.light(1),
            Some(&TrafficLight {
                is_green: false,
                remaining_red: 3
            })
        );
    }

    #[test]
    fn test_stats_track_fill_and_clear() {
        let mut highway = Highway::new_with_seed(&quiet_config(40), 6).unwrap();
        highway.random_fill(0.5, 0.0).unwrap();
        assert!(highway.car_count() > 0);
        assert_eq!(highway.stats().cars, highway.car_count());

        highway.clear();
        assert_eq!(highway.stats().cars, 0);
    }

    #[test]
    fn test_parameter_validation() {
        let mut highway = Highway::new_with_seed(&quiet_config(5), 1).unwrap();
        assert!(highway.set_car_linger(1.1).is_err());
        assert_eq!(highway.car_linger(), 0.0);
        assert!(highway.set_red_probability(-0.5).is_err());
        assert!(highway.set_red_duration(0).is_err());
        assert_eq!(highway.red_duration(), 2);
        assert!(highway.place(0, car(6)).is_err());
        assert!(highway.car(0).is_none());

        assert!(highway.set_car_linger(0.5).is_ok());
        assert_eq!(highway.car_linger(), 0.5);
    }

    #[test]
    fn test_cycle_velocity_wraps() {
        let mut highway = Highway::new_with_seed(&quiet_config(5), 1).unwrap();
        assert_eq!(highway.cycle_velocity(0), None);

        highway.place(0, car(4)).unwrap();
        assert_eq!(highway.cycle_velocity(0), Some(5));
        assert_eq!(highway.cycle_velocity(0), Some(0));
    }

    #[test]
    fn test_place_none_clears_both_planes() {
        let mut highway = Highway::new_with_seed(&quiet_config(5), 1).unwrap();
        highway.place(3, car(2)).unwrap();
        highway.place(3, Some(RoadFeature::TrafficLight)).unwrap();
        assert_eq!(highway.car(3), Some(&Car { velocity: 2 }));
        assert!(highway.light(3).is_some());

        highway.place(8, None).unwrap();
        assert!(highway.car(3).is_none());
        assert!(highway.light(3).is_none());
    }

    #[test]
    fn test_display() {
        let mut highway = Highway::new_with_seed(&quiet_config(4), 1).unwrap();
        highway.place(1, car(3)).unwrap();
        highway.place(2, Some(RoadFeature::TrafficLight)).unwrap();
        assert_eq!(highway.to_string(), ".3..\n  G \n");
    }
}
