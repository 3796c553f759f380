use rand::Rng;
use serde::Serialize;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};
use tracing::trace;

use crate::components::*;
use crate::config::SimConfig;
use crate::pheromones::PheromoneField;

/// Food removed from a source per pickup.
pub const FEED_QUANTITY: f32 = 0.5;
/// Half-width of the block averaged when judging how fresh a discovery is.
pub const NEIGHBORHOOD_RADIUS: i64 = 5;
const DISCOVERY_BOOST: f32 = 100.0;
const DISCOVERY_OFFSET: f32 = 0.1;
const RETURN_BLEND: f32 = 0.3;
const RETURN_JITTER: f32 = 0.1;
const WANDER: f32 = FRAC_PI_4;
const MIN_TURN: f32 = 0.1;
const MAX_TURN: f32 = 0.5;
/// Keeps edge reflections strictly inside the inward half-plane.
const EDGE_MARGIN: f32 = 0.1;

/// What an ant did this tick that the colony keeps score of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AntEvent {
    FoundFood { source: usize, taken: f32 },
    Delivered,
}

/// Everything an ant may read or write during its turn. The orchestrator
/// lends these out one ant at a time, so earlier deposits in a tick are
/// visible to later ants.
pub struct Surroundings<'a> {
    pub arena: Arena,
    pub field: &'a mut PheromoneField,
    pub nest: &'a Nest,
    pub food: &'a mut [FoodSource],
}

#[derive(Debug, Clone)]
pub struct Ant {
    pub x: f32,
    pub y: f32,
    /// Radians, kept in `[-PI, PI)`.
    pub heading: f32,
    pub state: ForagingState,
    pub trail: TrailMemory,
}

/// Read-only view handed to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AntView {
    pub x: f32,
    pub y: f32,
    pub heading: f32,
    pub has_food: bool,
}

impl Ant {
    pub fn new(x: f32, y: f32, heading: f32) -> Self {
        Self {
            x,
            y,
            heading: wrap_angle(heading),
            state: ForagingState::Searching,
            trail: TrailMemory::default(),
        }
    }

    /// A fresh searcher at the nest facing a random direction.
    pub fn spawn_at<R: Rng + ?Sized>(nest: &Nest, rng: &mut R) -> Self {
        Self::new(nest.x, nest.y, rng.gen_range(0.0..TAU))
    }

    pub fn has_food(&self) -> bool {
        self.state == ForagingState::Returning
    }

    pub fn view(&self) -> AntView {
        AntView {
            x: self.x,
            y: self.y,
            heading: self.heading,
            has_food: self.has_food(),
        }
    }

    /// One tick: move, transition, deposit, steer.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        config: &SimConfig,
        world: &mut Surroundings<'_>,
        rng: &mut R,
    ) -> Option<AntEvent> {
        if world.arena.is_degenerate() {
            return None;
        }

        self.advance(config.ant_speed, world.arena, rng);
        let event = self.transition(config, world);

        if self.has_food() && world.field.world_to_grid(self.x, self.y).is_some() {
            world.field.deposit(self.x, self.y, config.deposit_amount);
            self.trail.record(self.x, self.y, config.deposit_amount);
        }

        match self.state {
            ForagingState::Searching => {
                if rng.gen::<f32>() < config.random_movement_factor {
                    self.heading += rng.gen_range(-WANDER..=WANDER);
                } else {
                    self.follow_trail(config, world.field, rng);
                }
            }
            ForagingState::Returning => {
                let bearing = (world.nest.y - self.y).atan2(world.nest.x - self.x);
                self.heading += wrap_angle(bearing - self.heading) * RETURN_BLEND
                    + rng.gen_range(-RETURN_JITTER..=RETURN_JITTER);
            }
        }
        self.heading = wrap_angle(self.heading);

        event
    }

    /// Moves along the heading, clamping to the arena. An ant that hits an
    /// edge is turned to face back inside.
    fn advance<R: Rng + ?Sized>(&mut self, speed: f32, arena: Arena, rng: &mut R) {
        self.x += self.heading.cos() * speed;
        self.y += self.heading.sin() * speed;

        let mut inward = (0.0f32, 0.0f32);
        if self.x < 0.0 {
            self.x = 0.0;
            inward.0 = 1.0;
        } else if self.x > arena.width {
            self.x = arena.width;
            inward.0 = -1.0;
        }
        if self.y < 0.0 {
            self.y = 0.0;
            inward.1 = 1.0;
        } else if self.y > arena.height {
            self.y = arena.height;
            inward.1 = -1.0;
        }

        if inward != (0.0, 0.0) {
            let base = inward.1.atan2(inward.0);
            // corners only leave a quarter turn of valid directions
            let half = if inward.0 != 0.0 && inward.1 != 0.0 {
                FRAC_PI_4
            } else {
                FRAC_PI_2
            };
            let spread = half - EDGE_MARGIN;
            self.heading = wrap_angle(base + rng.gen_range(-spread..=spread));
        }
    }

    fn transition(
        &mut self,
        config: &SimConfig,
        world: &mut Surroundings<'_>,
    ) -> Option<AntEvent> {
        match self.state {
            ForagingState::Searching => {
                let source = world
                    .food
                    .iter()
                    .position(|food| food.is_active() && food.in_reach(self.x, self.y))?;
                let taken = world.food[source].take(FEED_QUANTITY);
                self.state = ForagingState::Returning;
                self.heading += PI;

                // quiet surroundings mean this ant got here first
                let ambient = world
                    .field
                    .neighborhood_average(self.x, self.y, NEIGHBORHOOD_RADIUS);
                let strength =
                    config.deposit_amount * (1.0 + DISCOVERY_BOOST / (DISCOVERY_OFFSET + ambient));
                self.trail.begin_run(TrailPoint {
                    x: self.x,
                    y: self.y,
                    strength,
                });
                trace!(source, strength, "ant picked up food");
                Some(AntEvent::FoundFood { source, taken })
            }
            ForagingState::Returning => {
                if !world.nest.contains(self.x, self.y) {
                    return None;
                }
                self.state = ForagingState::Searching;
                self.heading += PI;
                trace!(trail_len = self.trail.len(), "ant delivered food");
                Some(AntEvent::Delivered)
            }
        }
    }

    /// Three-sensor taxis: keep going if nothing beats straight ahead,
    /// otherwise turn a random amount toward the stronger side.
    fn follow_trail<R: Rng + ?Sized>(
        &mut self,
        config: &SimConfig,
        field: &PheromoneField,
        rng: &mut R,
    ) {
        let distance = config.sensor_distance;
        let forward = field.sample_directional(self.x, self.y, self.heading, distance);
        let left = field.sample_directional(
            self.x,
            self.y,
            self.heading - config.sensor_angle,
            distance,
        );
        let right = field.sample_directional(
            self.x,
            self.y,
            self.heading + config.sensor_angle,
            distance,
        );

        if forward >= left && forward >= right {
            return;
        }
        if left > right {
            self.heading -= rng.gen_range(MIN_TURN..=MAX_TURN);
        } else if right > left {
            self.heading += rng.gen_range(MIN_TURN..=MAX_TURN);
        }
    }
}

/// Wraps an angle into `[-PI, PI)`.
pub fn wrap_angle(angle: f32) -> f32 {
    angle - TAU * ((angle + PI) / TAU).floor()
}
