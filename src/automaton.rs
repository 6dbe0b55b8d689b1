//! Common driver interface over the three automata.

use crate::config::Config;
use crate::error::SimError;
use crate::highway::Highway;
use crate::motorway::Motorway;
use crate::ocean::Ocean;
use crate::stats::{OceanStats, TrafficStats};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which automaton to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SimulationKind {
    Ocean,
    Highway,
    Motorway,
}

impl SimulationKind {
    pub const ALL: [SimulationKind; 3] = [
        SimulationKind::Ocean,
        SimulationKind::Highway,
        SimulationKind::Motorway,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SimulationKind::Ocean => "ocean",
            SimulationKind::Highway => "highway",
            SimulationKind::Motorway => "motorway",
        }
    }

    /// Build a randomly filled instance from its config section.
    ///
    /// Without a seed, one is drawn from the thread RNG.
    pub fn build(self, config: &Config, seed: Option<u64>) -> Result<Box<dyn Automaton>, SimError> {
        let seed = seed.unwrap_or_else(rand::random);

        let automaton: Box<dyn Automaton> = match self {
            SimulationKind::Ocean => {
                let section = &config.ocean;
                let mut ocean = Ocean::new_with_seed(section, seed)?;
                ocean.random_fill(section.initial_fish, section.initial_sharks)?;
                Box::new(ocean)
            }
            SimulationKind::Highway => {
                let section = &config.highway;
                let mut highway = Highway::new_with_seed(section, seed)?;
                highway.random_fill(section.initial_cars, section.initial_lights)?;
                Box::new(highway)
            }
            SimulationKind::Motorway => {
                let section = &config.motorway;
                let mut motorway = Motorway::new_with_seed(section, seed)?;
                motorway.random_fill(section.initial_cars)?;
                Box::new(motorway)
            }
        };

        log::debug!("Built {} automaton (seed {})", self, seed);
        Ok(automaton)
    }
}

impl fmt::Display for SimulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Statistics of any automaton, tagged with its kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Snapshot {
    Ocean(OceanStats),
    Highway(TrafficStats),
    Motorway(TrafficStats),
}

/// A discrete-time automaton driven one generation per `step()`.
///
/// Instances own their grid and random source exclusively. They are
/// `Send` so independent instances can run on separate threads, but one
/// instance is never stepped concurrently.
pub trait Automaton: fmt::Display + Send {
    fn kind(&self) -> SimulationKind;

    /// Advance one generation
    fn step(&mut self);

    /// Number of completed steps
    fn generation(&self) -> u64;

    /// Entities currently on the grid
    fn population(&self) -> usize;

    fn summary(&self) -> String;

    fn snapshot(&self) -> Snapshot;

    fn seed(&self) -> u64;

    fn is_extinct(&self) -> bool {
        self.population() == 0
    }

    fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Run with a callback after every step for progress updates
    fn run_with_callback<F>(&mut self, steps: u64, mut callback: F)
    where
        F: FnMut(&Self, u64),
        Self: Sized,
    {
        for i in 0..steps {
            self.step();
            callback(self, i);
        }
    }
}

impl Automaton for Ocean {
    fn kind(&self) -> SimulationKind {
        SimulationKind::Ocean
    }

    fn step(&mut self) {
        Ocean::step(self)
    }

    fn generation(&self) -> u64 {
        Ocean::generation(self)
    }

    fn population(&self) -> usize {
        self.stats().population()
    }

    fn summary(&self) -> String {
        Ocean::summary(self)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::Ocean(self.stats().clone())
    }

    fn seed(&self) -> u64 {
        Ocean::seed(self)
    }
}

impl Automaton for Highway {
    fn kind(&self) -> SimulationKind {
        SimulationKind::Highway
    }

    fn step(&mut self) {
        Highway::step(self)
    }

    fn generation(&self) -> u64 {
        Highway::generation(self)
    }

    fn population(&self) -> usize {
        self.car_count()
    }

    fn summary(&self) -> String {
        Highway::summary(self)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::Highway(self.stats().clone())
    }

    fn seed(&self) -> u64 {
        Highway::seed(self)
    }
}

impl Automaton for Motorway {
    fn kind(&self) -> SimulationKind {
        SimulationKind::Motorway
    }

    fn step(&mut self) {
        Motorway::step(self)
    }

    fn generation(&self) -> u64 {
        Motorway::generation(self)
    }

    fn population(&self) -> usize {
        self.car_count()
    }

    fn summary(&self) -> String {
        Motorway::summary(self)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::Motorway(self.stats().clone())
    }

    fn seed(&self) -> u64 {
        Motorway::seed(self)
    }
}
