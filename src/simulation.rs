use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ant::{Ant, AntEvent, AntView, Surroundings};
use crate::components::*;
use crate::config::SimConfig;
use crate::pheromones::PheromoneField;

pub const MIN_FOOD_SEPARATION: f32 = 100.0;
pub const MIN_NEST_DISTANCE: f32 = 150.0;
/// Food candidates are drawn at least this far from every edge.
pub const EDGE_PADDING: f32 = 50.0;
pub const MAX_PLACEMENT_ATTEMPTS: usize = 5_000;

/// Running totals for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimStats {
    pub tick: u64,
    pub discoveries: u64,
    pub deliveries: u64,
    pub food_collected: f32,
}

/// Owned copy of everything a renderer needs after a tick.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub arena: Arena,
    pub field: Vec<f32>,
    pub ants: Vec<AntView>,
    pub food: Vec<FoodSource>,
    pub nest: Nest,
}

/// Result of scattering food over the arena.
#[derive(Debug, Clone)]
pub struct Placement {
    pub sources: Vec<FoodSource>,
    /// Set when some source had to settle for the best rejected candidate.
    pub relaxed: bool,
}

/// Rejection-samples `count` food sources away from the nest and from each
/// other. Each source gets [`MAX_PLACEMENT_ATTEMPTS`] tries; when none
/// satisfies both distances the least-violating candidate is kept.
pub fn place_food<R: Rng + ?Sized>(
    arena: Arena,
    nest: &Nest,
    count: usize,
    radius: f32,
    amount: f32,
    rng: &mut R,
) -> Placement {
    let mut sources: Vec<FoodSource> = Vec::with_capacity(count);
    let mut relaxed = false;

    for _ in 0..count {
        let mut best: Option<((f32, f32), f32)> = None;

        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let candidate = (
                sample_axis(arena.width, rng),
                sample_axis(arena.height, rng),
            );
            let slack = placement_slack(candidate, nest, &sources);
            if best.map_or(true, |(_, best_slack)| slack > best_slack) {
                best = Some((candidate, slack));
            }
            if slack >= 0.0 {
                break;
            }
        }

        let Some(((x, y), slack)) = best else {
            continue;
        };
        if slack < 0.0 {
            relaxed = true;
            warn!(
                x,
                y,
                slack,
                "food placement hit its attempt cap; keeping best candidate"
            );
        }
        sources.push(FoodSource::new(x, y, radius, amount));
    }

    Placement { sources, relaxed }
}

fn sample_axis<R: Rng + ?Sized>(length: f32, rng: &mut R) -> f32 {
    if length > 2.0 * EDGE_PADDING {
        rng.gen_range(EDGE_PADDING..length - EDGE_PADDING)
    } else if length > 0.0 {
        rng.gen_range(0.0..length)
    } else {
        0.0
    }
}

/// Smallest margin by which `candidate` clears the distance rules;
/// negative when it violates one.
fn placement_slack(candidate: (f32, f32), nest: &Nest, placed: &[FoodSource]) -> f32 {
    let (x, y) = candidate;
    placed
        .iter()
        .map(|food| distance(x, y, food.x, food.y) - MIN_FOOD_SEPARATION)
        .fold(distance(x, y, nest.x, nest.y) - MIN_NEST_DISTANCE, f32::min)
}

/// Owns the arena and everything in it, and advances them one tick at a time.
pub struct Simulation {
    config: SimConfig,
    arena: Arena,
    field: PheromoneField,
    nest: Nest,
    food: Vec<FoodSource>,
    ants: Vec<Ant>,
    rng: StdRng,
    stats: SimStats,
    placement_relaxed: bool,
}

impl Simulation {
    /// Builds a simulation with an entropy-seeded random source.
    pub fn new(config: SimConfig, width: usize, height: usize) -> Self {
        Self::with_rng(config, width, height, StdRng::from_entropy())
    }

    /// Builds a reproducible simulation.
    pub fn with_seed(config: SimConfig, width: usize, height: usize, seed: u64) -> Self {
        Self::with_rng(config, width, height, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(config: SimConfig, width: usize, height: usize, rng: StdRng) -> Self {
        let config = config.clamped();
        let arena = Arena::new(width, height);
        let mut sim = Self {
            field: PheromoneField::new(width, height, config.field_cap),
            nest: Nest::at_center(arena, config.nest_radius),
            food: Vec::new(),
            ants: Vec::new(),
            arena,
            config,
            rng,
            stats: SimStats::default(),
            placement_relaxed: false,
        };
        sim.populate();
        sim
    }

    fn populate(&mut self) {
        self.nest = Nest::at_center(self.arena, self.config.nest_radius);
        let placement = place_food(
            self.arena,
            &self.nest,
            self.config.food_count,
            self.config.food_radius,
            self.config.initial_food_amount,
            &mut self.rng,
        );
        self.food = placement.sources;
        self.placement_relaxed = placement.relaxed;
        self.ants.clear();
        self.reconcile_population(self.config.population);

        info!(
            width = self.arena.width,
            height = self.arena.height,
            food = self.food.len(),
            ants = self.ants.len(),
            "simulation initialized"
        );
    }

    /// Advances one tick: population, then evaporation, then every ant in order.
    pub fn step(&mut self) {
        self.reconcile_population(self.config.population);
        self.stats.tick += 1;
        if self.arena.is_degenerate() {
            return;
        }

        self.field.decay(self.config.evaporation_rate);

        let mut world = Surroundings {
            arena: self.arena,
            field: &mut self.field,
            nest: &self.nest,
            food: &mut self.food,
        };
        for ant in self.ants.iter_mut() {
            match ant.update(&self.config, &mut world, &mut self.rng) {
                Some(AntEvent::FoundFood { source, taken }) => {
                    self.stats.discoveries += 1;
                    self.stats.food_collected += taken;
                    if !world.food[source].is_active() {
                        debug!(source, tick = self.stats.tick, "food source depleted");
                    }
                }
                Some(AntEvent::Delivered) => self.stats.deliveries += 1,
                None => {}
            }
        }
    }

    /// Grows the colony with fresh searchers at the nest or drops ants from
    /// the end until it has `target` members.
    pub fn reconcile_population(&mut self, target: usize) {
        let current = self.ants.len();
        if current < target {
            let nest = self.nest;
            let rng = &mut self.rng;
            self.ants
                .extend((current..target).map(|_| Ant::spawn_at(&nest, &mut *rng)));
        } else if current > target {
            self.ants.truncate(target);
        } else {
            return;
        }
        debug!(from = current, to = target, "population reconciled");
    }

    /// Discards ants, food and trails and lays the arena out again with the
    /// current config. Arena size and config are untouched.
    pub fn reset(&mut self) {
        self.field = PheromoneField::new(
            self.field.width(),
            self.field.height(),
            self.config.field_cap,
        );
        self.stats = SimStats::default();
        self.populate();
    }

    /// Replaces the config between ticks, clamping it first. Population
    /// follows on the next `step`; food and nest sizes on the next `reset`.
    pub fn update_config(&mut self, config: SimConfig) {
        let config = config.clamped();
        if config == self.config {
            return;
        }
        if config.field_cap != self.field.cap() {
            self.field.set_cap(config.field_cap);
        }
        info!(
            population = config.population,
            evaporation_rate = config.evaporation_rate,
            random_movement_factor = config.random_movement_factor,
            ant_speed = config.ant_speed,
            "config updated"
        );
        self.config = config;
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn arena(&self) -> Arena {
        self.arena
    }

    pub fn field(&self) -> &PheromoneField {
        &self.field
    }

    pub fn nest(&self) -> &Nest {
        &self.nest
    }

    pub fn food(&self) -> &[FoodSource] {
        &self.food
    }

    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Whether the last placement had to relax the distance rules.
    pub fn placement_relaxed(&self) -> bool {
        self.placement_relaxed
    }

    pub fn returning_count(&self) -> usize {
        self.ants.iter().filter(|ant| ant.has_food()).count()
    }

    pub fn active_food_count(&self) -> usize {
        self.food.iter().filter(|food| food.is_active()).count()
    }

    pub fn remaining_food(&self) -> f32 {
        self.food.iter().map(|food| food.amount).sum()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.stats.tick,
            arena: self.arena,
            field: self.field.cells().to_vec(),
            ants: self.ants.iter().map(Ant::view).collect(),
            food: self.food.clone(),
            nest: self.nest,
        }
    }
}
