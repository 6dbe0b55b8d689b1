//! Two-lane motorway with overtaking.
//!
//! Cars are updated in place during a single scan, fast lane before normal
//! lane at each position. Like the ocean, each car carries the generation
//! it may next act in, so a car pushed ahead of the scan is not revisited.

use crate::choice::chance;
use crate::config::MotorwayConfig;
use crate::error::{ensure_probability, ensure_velocity, SimError};
use crate::grid::ToroidalGrid;
use crate::stats::TrafficStats;
use crate::traffic::{accelerate, linger, MAX_VELOCITY};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A motorway lane. The discriminant is the grid row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    Fast = 0,
    Normal = 1,
}

impl Lane {
    pub const ALL: [Lane; 2] = [Lane::Fast, Lane::Normal];

    #[inline]
    fn row(self) -> i64 {
        self as i64
    }
}

/// A car on the motorway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorCar {
    pub velocity: u32,
    /// Generation in which the car may next act
    next_generation: u64,
}

impl MotorCar {
    pub fn new(velocity: u32, next_generation: u64) -> Self {
        Self {
            velocity,
            next_generation,
        }
    }

    pub fn next_generation(&self) -> u64 {
        self.next_generation
    }

    #[inline]
    pub fn is_pending(&self, generation: u64) -> bool {
        self.next_generation == generation
    }
}

/// The two-lane traffic automaton
pub struct Motorway {
    /// Row 0 is the fast lane, row 1 the normal lane
    lanes: ToroidalGrid<MotorCar>,

    // State
    generation: u64,
    stats: TrafficStats,

    // Parameters
    linger: f64,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,
}

impl Motorway {
    /// Create an empty motorway with a random seed
    pub fn new(config: &MotorwayConfig) -> Result<Self, SimError> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create an empty motorway with a specific seed for reproducibility
    pub fn new_with_seed(config: &MotorwayConfig, seed: u64) -> Result<Self, SimError> {
        config.validate()?;

        log::debug!(
            "Motorway created: length={}, linger={}, seed={}",
            config.length,
            config.linger,
            seed
        );

        Ok(Self {
            lanes: ToroidalGrid::new(config.length, Lane::ALL.len())?,
            generation: 0,
            stats: TrafficStats::new(),
            linger: config.linger,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        })
    }

    /// Advance one generation
    pub fn step(&mut self) {
        let generation = self.generation;

        for pos in 0..self.length() as i64 {
            for lane in Lane::ALL {
                let pending = self
                    .lanes
                    .get(pos, lane.row())
                    .is_some_and(|car| car.is_pending(generation));
                if pending {
                    self.update_car(lane, pos);
                }
            }
        }

        self.generation += 1;
        self.stats.update(
            self.generation,
            self.lanes.iter().map(|(_, car)| car.velocity),
        );

        log::trace!("{}", self.stats.summary());
    }

    /// Run the motorway for the given number of generations
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    fn update_car(&mut self, lane: Lane, pos: i64) {
        let Some(car) = self.lanes.get(pos, lane.row()).copied() else {
            return;
        };

        let mut velocity = accelerate(car.velocity);
        velocity = linger(&mut self.rng, velocity, self.linger);

        // Overtake when blocked in the normal lane, otherwise brake
        let mut target = lane;
        if let Some(gap) = self.gap_ahead(lane, pos).filter(|&gap| gap < velocity) {
            let fast_clear = self
                .gap_ahead(Lane::Fast, pos)
                .map_or(true, |ahead| ahead >= velocity);
            if lane == Lane::Normal && self.can_enter(Lane::Fast, pos) && fast_clear {
                target = Lane::Fast;
            } else {
                velocity = velocity.min(gap);
            }
        }

        // Merge back whenever the normal lane allows it
        if lane == Lane::Fast && target == Lane::Fast && self.can_enter(Lane::Normal, pos) {
            target = Lane::Normal;
            if let Some(gap) = self.gap_ahead(Lane::Normal, pos) {
                velocity = velocity.min(gap);
            }
        }

        self.lanes.take(pos, lane.row());
        let moved = MotorCar::new(velocity, self.generation + 1);
        let previous = self
            .lanes
            .set(pos + velocity as i64, target.row(), Some(moved));
        debug_assert!(previous.is_none(), "car moved onto an occupied cell");
    }

    /// Free cells between `pos` and the next car ahead in `lane`, or `None`
    /// if the lane is empty. A car's own cell counts as the obstacle after
    /// a full lap.
    pub fn gap_ahead(&self, lane: Lane, pos: i64) -> Option<u32> {
        (0..self.length() as i64)
            .find(|&i| !self.lanes.is_free(pos + 1 + i, lane.row()))
            .map(|i| i as u32)
    }

    /// Free cells between `pos` and the nearest car behind in `lane`,
    /// paired with that car's velocity.
    pub fn nearest_behind(&self, lane: Lane, pos: i64) -> Option<(u32, u32)> {
        (0..self.length() as i64).find_map(|i| {
            self.lanes
                .get(pos - 1 - i, lane.row())
                .map(|car| (i as u32, car.velocity))
        })
    }

    /// A car may move sideways into `lane` at `pos` if the cell is free and
    /// the nearest car behind cannot reach it next tick.
    pub fn can_enter(&self, lane: Lane, pos: i64) -> bool {
        self.lanes.is_free(pos, lane.row())
            && self
                .nearest_behind(lane, pos)
                .map_or(true, |(gap, velocity)| gap >= velocity)
    }

    /// Overwrite a cell. A new car may act in the current generation.
    pub fn place(&mut self, lane: Lane, pos: i64, velocity: Option<u32>) -> Result<(), SimError> {
        let car = match velocity {
            Some(v) => Some(MotorCar::new(ensure_velocity(v, MAX_VELOCITY)?, self.generation)),
            None => None,
        };
        self.lanes.set(pos, lane.row(), car);
        Ok(())
    }

    /// Speed a car up by one. A car pushed past the maximum velocity is
    /// taken off the road. Returns the new velocity if the car remains.
    pub fn bump_velocity(&mut self, lane: Lane, pos: i64) -> Option<u32> {
        let car = self.lanes.get_mut(pos, lane.row())?;
        car.velocity += 1;
        if car.velocity > MAX_VELOCITY {
            self.lanes.take(pos, lane.row());
            return None;
        }
        Some(car.velocity)
    }

    /// Independently place a standing car in each cell of both lanes with
    /// probability `density`.
    pub fn random_fill(&mut self, density: f64) -> Result<(), SimError> {
        ensure_probability("density", density)?;

        for pos in 0..self.length() as i64 {
            for lane in Lane::ALL {
                if chance(&mut self.rng, density) {
                    self.lanes
                        .set(pos, lane.row(), Some(MotorCar::new(0, self.generation)));
                }
            }
        }

        self.stats.recount(self.car_count());
        log::debug!("Motorway filled randomly: cars={}", self.car_count());
        Ok(())
    }

    /// Remove every car. Generation and parameters are kept.
    pub fn clear(&mut self) {
        self.lanes.clear();
        self.stats.recount(0);
    }

    pub fn set_linger(&mut self, p: f64) -> Result<(), SimError> {
        self.linger = ensure_probability("linger", p)?;
        log::debug!("Motorway linger set to {}", p);
        Ok(())
    }

    pub fn linger(&self) -> f64 {
        self.linger
    }

    pub fn car(&self, lane: Lane, pos: i64) -> Option<&MotorCar> {
        self.lanes.get(pos, lane.row())
    }

    /// Cars of one lane in ascending position order
    pub fn cars(&self, lane: Lane) -> impl Iterator<Item = (usize, &MotorCar)> + '_ {
        self.lanes.row(lane.row())
    }

    pub fn length(&self) -> usize {
        self.lanes.width()
    }

    /// Number of completed steps
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn average_velocity(&self) -> f64 {
        self.stats.average_velocity
    }

    pub fn car_count(&self) -> usize {
        self.lanes.occupied()
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

impl fmt::Display for Motorway {
    /// Fast lane on the first line, normal lane on the second.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for lane in Lane::ALL {
            for pos in 0..self.length() as i64 {
                match self.car(lane, pos) {
                    Some(car) => write!(f, "{}", car.velocity)?,
                    None => write!(f, ".")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
