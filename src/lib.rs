//! # CELLSIM
//!
//! Discrete-time cellular automata on wraparound grids.
//!
//! ## Automata
//!
//! - **Ocean**: predator-prey grid of fish and sharks, updated in place
//! - **Highway**: single-lane traffic with lights, double-buffered
//! - **Motorway**: two-lane traffic with overtaking, updated in place
//!
//! Each instance owns a seeded random source, so runs are reproducible.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cellsim::{Config, Ocean, Species};
//!
//! let config = Config::default();
//! let mut ocean = Ocean::new_with_seed(&config.ocean, 42).unwrap();
//!
//! ocean.place(3, 4, Some(Species::Shark));
//! ocean.random_fill(0.2, 0.0).unwrap();
//! ocean.run(100);
//!
//! println!("{}", ocean.summary());
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use cellsim::{Config, SimulationKind};
//!
//! let mut config = Config::default();
//! config.highway.length = 80;
//! config.highway.red_probability = 0.1;
//!
//! let mut highway = SimulationKind::Highway.build(&config, Some(7)).unwrap();
//! highway.run(10);
//! assert_eq!(highway.generation(), 10);
//! ```

pub mod automaton;
pub mod choice;
pub mod config;
pub mod error;
pub mod grid;
pub mod highway;
pub mod motorway;
pub mod ocean;
pub mod stats;
pub mod traffic;

// Re-export main types
pub use automaton::{Automaton, SimulationKind, Snapshot};
pub use choice::TieBreak;
pub use config::Config;
pub use error::SimError;
pub use grid::ToroidalGrid;
pub use highway::{Highway, RoadFeature};
pub use motorway::{Lane, Motorway};
pub use ocean::{Ocean, Species};

use rayon::prelude::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run every automaton kind for `steps` generations, one per worker thread.
pub fn benchmark(steps: u64, seed: u64) -> Result<Vec<BenchmarkResult>, SimError> {
    use std::time::Instant;

    let config = Config::default();

    SimulationKind::ALL
        .par_iter()
        .map(|&kind| {
            let mut automaton = kind.build(&config, Some(seed))?;
            let initial_population = automaton.population();

            let start = Instant::now();
            automaton.run(steps);
            let elapsed = start.elapsed();

            Ok(BenchmarkResult {
                kind,
                steps,
                initial_population,
                final_population: automaton.population(),
                elapsed_secs: elapsed.as_secs_f64(),
                steps_per_second: steps as f64 / elapsed.as_secs_f64(),
            })
        })
        .collect()
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub kind: SimulationKind,
    pub steps: u64,
    pub initial_population: usize,
    pub final_population: usize,
    pub elapsed_secs: f64,
    pub steps_per_second: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== {} ===", self.kind)?;
        writeln!(f, "Steps: {}", self.steps)?;
        writeln!(f, "Population: {} -> {}", self.initial_population, self.final_population)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} steps/s", self.steps_per_second)?;
        Ok(())
    }
}
