//! Predator-prey ocean: fish and sharks on a toroidal grid.
//!
//! The grid is updated in place by a single row-major scan. Each creature
//! carries the generation at which it may next act; a creature that has
//! already acted (or was born) this generation carries a later stamp and is
//! skipped if the scan reaches it again.

use crate::choice::TieBreak;
use crate::config::OceanConfig;
use crate::error::{ensure_positive, ensure_probability, SimError};
use crate::grid::{Coord, ToroidalGrid};
use crate::stats::{AgeBucket, OceanStats};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Generations a shark survives without eating.
pub const SHARK_STARVATION: u32 = 2;

/// The two kinds of creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Fish,
    Shark,
}

/// Per-species state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatureKind {
    Fish,
    /// `starvation` counts down on every tick without food; zero is death.
    Shark { starvation: u32 },
}

/// A fish or shark occupying one ocean cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Creature {
    pub kind: CreatureKind,
    /// Generations survived
    pub age: u32,
    /// Generation at which this creature next acts
    next_generation: u64,
}

impl Creature {
    /// A new creature that first acts in `next_generation`.
    pub fn new(species: Species, next_generation: u64) -> Self {
        let kind = match species {
            Species::Fish => CreatureKind::Fish,
            Species::Shark => CreatureKind::Shark {
                starvation: SHARK_STARVATION,
            },
        };
        Self {
            kind,
            age: 0,
            next_generation,
        }
    }

    pub fn species(&self) -> Species {
        match self.kind {
            CreatureKind::Fish => Species::Fish,
            CreatureKind::Shark { .. } => Species::Shark,
        }
    }

    #[inline]
    pub fn is_fish(&self) -> bool {
        matches!(self.kind, CreatureKind::Fish)
    }

    #[inline]
    pub fn is_shark(&self) -> bool {
        matches!(self.kind, CreatureKind::Shark { .. })
    }

    /// Remaining starvation budget, sharks only.
    pub fn starvation(&self) -> Option<u32> {
        match self.kind {
            CreatureKind::Shark { starvation } => Some(starvation),
            CreatureKind::Fish => None,
        }
    }

    /// Generation at which this creature next acts.
    pub fn next_generation(&self) -> u64 {
        self.next_generation
    }

    #[inline]
    pub fn is_pending(&self, generation: u64) -> bool {
        self.next_generation == generation
    }

    fn symbol(&self) -> char {
        match self.kind {
            CreatureKind::Fish => 'f',
            CreatureKind::Shark { starvation } if starvation >= SHARK_STARVATION => 'S',
            CreatureKind::Shark { .. } => 's',
        }
    }
}

/// The predator-prey automaton
pub struct Ocean {
    grid: ToroidalGrid<Creature>,

    // State
    generation: u64,
    stats: OceanStats,

    // Rules
    fish_cycle: u32,
    shark_cycle: u32,
    tie_break: TieBreak,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,
}

impl Ocean {
    /// Create an empty ocean with a random seed
    pub fn new(config: &OceanConfig) -> Result<Self, SimError> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create an empty ocean with a specific seed for reproducibility
    pub fn new_with_seed(config: &OceanConfig, seed: u64) -> Result<Self, SimError> {
        config.validate()?;
        let grid = ToroidalGrid::new(config.width, config.height)?;

        log::debug!(
            "Ocean created: {}x{}, fish_cycle={}, shark_cycle={}, seed={}",
            config.width,
            config.height,
            config.fish_cycle,
            config.shark_cycle,
            seed
        );

        let mut ocean = Self {
            grid,
            generation: 0,
            stats: OceanStats::new(),
            fish_cycle: config.fish_cycle,
            shark_cycle: config.shark_cycle,
            tie_break: config.tie_break,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        };
        ocean.update_stats();

        Ok(ocean)
    }

    /// Advance one generation
    pub fn step(&mut self) {
        let generation = self.generation;

        // Phase 1: In-place row-major update of every pending creature
        for y in 0..self.grid.height() as i64 {
            for x in 0..self.grid.width() as i64 {
                let pending = self
                    .grid
                    .get(x, y)
                    .is_some_and(|c| c.is_pending(generation));
                if pending {
                    self.update_creature((x as usize, y as usize));
                }
            }
        }

        self.generation += 1;

        // Phase 2: Recount
        self.update_stats();

        log::trace!("{}", self.stats.summary());
    }

    /// Run the ocean for the given number of generations
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    fn update_creature(&mut self, pos: Coord) {
        let Some(creature) = self.grid.get(pos.0 as i64, pos.1 as i64).copied() else {
            return;
        };

        let end = match creature.kind {
            CreatureKind::Fish => Some(self.update_fish(pos)),
            CreatureKind::Shark { .. } => self.update_shark(pos),
        };

        // Stamp the creature wherever it ended up, unless it died
        if let Some((x, y)) = end {
            if let Some(c) = self.grid.get_mut(x as i64, y as i64) {
                c.age += 1;
                c.next_generation = self.generation + 1;
            }
        }
    }

    /// Fish rules. Returns the fish's final position.
    fn update_fish(&mut self, mut pos: Coord) -> Coord {
        let generation = self.generation;

        // Rule 1: move to a free neighbour on reproduction-cycle generations
        if generation % self.fish_cycle as u64 == 0 {
            if let Some(target) = self.pick_free_neighbour(pos) {
                self.relocate(pos, target);
                pos = target;
            }
        }

        // Rule 2: a newborn fish appears on a free neighbour
        if let Some(target) = self.pick_free_neighbour(pos) {
            self.spawn(target, Species::Fish);
        }

        pos
    }

    /// Shark rules. Returns the shark's final position, or `None` if it
    /// starved.
    fn update_shark(&mut self, mut pos: Coord) -> Option<Coord> {
        let generation = self.generation;

        // Rule 1: eat every neighbouring fish
        let prey = self
            .grid
            .neighbours_matching(pos.0 as i64, pos.1 as i64, Creature::is_fish);
        for &(x, y) in &prey {
            self.grid.set(x as i64, y as i64, None);
        }
        let ate = !prey.is_empty();

        // Rule 2: a hungry shark moves to a free neighbour
        if !ate {
            if let Some(target) = self.pick_free_neighbour(pos) {
                self.relocate(pos, target);
                pos = target;
            }
        }

        // Rule 3: breed on reproduction-cycle generations
        if generation % self.shark_cycle as u64 == 0 {
            if let Some(target) = self.pick_free_neighbour(pos) {
                self.spawn(target, Species::Shark);
            }
        }

        // Rule 4: starvation
        let (x, y) = (pos.0 as i64, pos.1 as i64);
        let starved = match self.grid.get_mut(x, y).map(|c| &mut c.kind) {
            Some(CreatureKind::Shark { starvation }) => {
                if ate {
                    *starvation = SHARK_STARVATION;
                } else {
                    *starvation = starvation.saturating_sub(1);
                }
                *starvation < 1
            }
            _ => false,
        };
        if starved {
            self.grid.set(x, y, None);
            return None;
        }

        Some(pos)
    }

    fn pick_free_neighbour(&mut self, pos: Coord) -> Option<Coord> {
        let free = self.grid.free_neighbours(pos.0 as i64, pos.1 as i64);
        self.tie_break.pick(&mut self.rng, &free).copied()
    }

    /// Move the occupant of `from` into `to` (clear, then write).
    fn relocate(&mut self, from: Coord, to: Coord) {
        let creature = self.grid.take(from.0 as i64, from.1 as i64);
        let previous = self.grid.set(to.0 as i64, to.1 as i64, creature);
        debug_assert!(previous.is_none(), "moved onto an occupied cell");
    }

    /// Place a newborn that first acts next generation.
    fn spawn(&mut self, at: Coord, species: Species) {
        let newborn = Creature::new(species, self.generation + 1);
        let previous = self.grid.set(at.0 as i64, at.1 as i64, Some(newborn));
        debug_assert!(previous.is_none(), "spawned onto an occupied cell");
    }

    fn update_stats(&mut self) {
        self.stats.reset(self.generation);
        for y in 0..self.grid.height() as i64 {
            for x in 0..self.grid.width() as i64 {
                match self.grid.get(x, y) {
                    None => self.stats.record_empty(),
                    Some(c) if c.is_fish() => self.stats.record_fish(c.age),
                    Some(c) => self.stats.record_shark(c.age),
                }
            }
        }
    }

    /// Overwrite a cell with a new creature (or clear it with `None`).
    ///
    /// The new creature acts in the next `step()`. Returns the previous
    /// occupant. Counts refresh on the next step.
    pub fn place(&mut self, x: i64, y: i64, species: Option<Species>) -> Option<Creature> {
        let creature = species.map(|s| Creature::new(s, self.generation));
        self.grid.set(x, y, creature)
    }

    /// Scatter `round(cells * ratio)` fish, then sharks, at uniformly
    /// random cells. Later placements overwrite earlier ones.
    pub fn random_fill(&mut self, fish: f64, sharks: f64) -> Result<(), SimError> {
        ensure_probability("fish", fish)?;
        ensure_probability("sharks", sharks)?;

        let (width, height) = (self.grid.width(), self.grid.height());
        let cells = (width * height) as f64;

        for (species, ratio) in [(Species::Fish, fish), (Species::Shark, sharks)] {
            let count = (cells * ratio).round() as usize;
            for _ in 0..count {
                let x = self.rng.gen_range(0..width) as i64;
                let y = self.rng.gen_range(0..height) as i64;
                self.place(x, y, Some(species));
            }
        }

        self.update_stats();
        log::debug!(
            "Ocean filled randomly: fish={}, sharks={}",
            self.stats.fish,
            self.stats.sharks
        );

        Ok(())
    }

    /// Remove every creature. Generation and rules are kept.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.update_stats();
    }

    /// Change a species' reproduction cycle, effective from the next step.
    pub fn set_repro_cycle(&mut self, species: Species, cycle: u32) -> Result<(), SimError> {
        match species {
            Species::Fish => self.fish_cycle = ensure_positive("fish_cycle", cycle)?,
            Species::Shark => self.shark_cycle = ensure_positive("shark_cycle", cycle)?,
        }
        log::debug!("{:?} reproduction cycle set to {}", species, cycle);
        Ok(())
    }

    pub fn repro_cycle(&self, species: Species) -> u32 {
        match species {
            Species::Fish => self.fish_cycle,
            Species::Shark => self.shark_cycle,
        }
    }

    pub fn set_tie_break(&mut self, tie_break: TieBreak) {
        self.tie_break = tie_break;
    }

    /// Creature at a cell (wraparound), for rendering
    pub fn get(&self, x: i64, y: i64) -> Option<&Creature> {
        self.grid.get(x, y)
    }

    /// All creatures in row-major order
    pub fn creatures(&self) -> impl Iterator<Item = (Coord, &Creature)> + '_ {
        self.grid.iter()
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Number of completed steps
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stats(&self) -> &OceanStats {
        &self.stats
    }

    pub fn fish_count(&self) -> usize {
        self.stats.fish
    }

    pub fn shark_count(&self) -> usize {
        self.stats.sharks
    }

    pub fn empty_count(&self) -> usize {
        self.stats.empty
    }

    /// Age -> (fish, sharks) histogram from the last recount
    pub fn age_distribution(&self) -> &BTreeMap<u32, AgeBucket> {
        &self.stats.age_distribution
    }

    /// Check if both species are extinct
    pub fn is_extinct(&self) -> bool {
        self.stats.population() == 0
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

impl fmt::Display for Ocean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.grid.height() as i64 {
            for x in 0..self.grid.width() as i64 {
                let symbol = self.grid.get(x, y).map_or('.', Creature::symbol);
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
