//! Statistics tracking for the automata.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fish and shark counts sharing one age.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeBucket {
    pub fish: usize,
    pub sharks: usize,
}

/// Ocean statistics snapshot, recomputed after every step
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OceanStats {
    /// Generation the snapshot was taken after
    pub generation: u64,
    /// Empty cells
    pub empty: usize,
    /// Cells holding a fish
    pub fish: usize,
    /// Cells holding a shark
    pub sharks: usize,
    /// Age -> counts per species, ascending by age
    pub age_distribution: BTreeMap<u32, AgeBucket>,
}

impl OceanStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all counts before a recount.
    pub fn reset(&mut self, generation: u64) {
        self.generation = generation;
        self.empty = 0;
        self.fish = 0;
        self.sharks = 0;
        self.age_distribution.clear();
    }

    pub fn record_empty(&mut self) {
        self.empty += 1;
    }

    pub fn record_fish(&mut self, age: u32) {
        self.fish += 1;
        self.age_distribution.entry(age).or_default().fish += 1;
    }

    pub fn record_shark(&mut self, age: u32) {
        self.sharks += 1;
        self.age_distribution.entry(age).or_default().sharks += 1;
    }

    /// Total living creatures
    pub fn population(&self) -> usize {
        self.fish + self.sharks
    }

    /// Mean age across all creatures
    pub fn age_mean(&self) -> f64 {
        let population = self.population();
        if population == 0 {
            return 0.0;
        }
        let total: u64 = self
            .age_distribution
            .iter()
            .map(|(&age, bucket)| age as u64 * (bucket.fish + bucket.sharks) as u64)
            .sum();
        total as f64 / population as f64
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "Gen:{:6} | Fish:{:5} | Sharks:{:5} | Empty:{:5} | Age:{:.1}",
            self.generation,
            self.fish,
            self.sharks,
            self.empty,
            self.age_mean()
        )
    }
}

/// Traffic statistics snapshot shared by highway and motorway
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficStats {
    /// Generation the snapshot was taken after
    pub generation: u64,
    /// Cars on the road
    pub cars: usize,
    /// Mean velocity of this tick alone
    pub tick_velocity: f64,
    /// Exponentially blended average velocity
    pub average_velocity: f64,
}

impl TrafficStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one tick's velocities into the running average.
    ///
    /// The running average is halved toward this tick's mean. An empty
    /// road contributes a mean of zero.
    pub fn update<I>(&mut self, generation: u64, velocities: I)
    where
        I: IntoIterator<Item = u32>,
    {
        let (sum, count) = velocities
            .into_iter()
            .fold((0u64, 0usize), |(sum, count), v| (sum + v as u64, count + 1));

        self.generation = generation;
        self.cars = count;
        self.tick_velocity = if count > 0 {
            sum as f64 / count as f64
        } else {
            0.0
        };
        self.average_velocity = (self.average_velocity + self.tick_velocity) / 2.0;
    }

    /// Refresh the car count without touching the running average.
    pub fn recount(&mut self, cars: usize) {
        self.cars = cars;
    }

    /// Average velocity rounded to two decimals.
    pub fn rounded_average(&self) -> f64 {
        (self.average_velocity * 100.0).round() / 100.0
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "Gen:{:6} | Cars:{:5} | Tick v:{:.2} | Avg v:{:.2}",
            self.generation,
            self.cars,
            self.tick_velocity,
            self.rounded_average()
        )
    }
}
